//! authgate
//! 共享的 bearer 令牌认证层，以及基于它构建的四个小型 HTTP 服务

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod server;
pub mod services;
pub mod telemetry;
