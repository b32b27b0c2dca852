//! 数据模型

pub mod auth;
pub mod balance;
pub mod catalog;
pub mod user;
