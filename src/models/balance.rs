//! Balance lookup models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    /// balance in ether, exact decimal
    pub balance: String,
}

/// JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: [&'a str; 2],
}

/// JSON-RPC 2.0 response
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<String>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}
