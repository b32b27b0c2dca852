//! 以太坊余额查询
//!
//! 只做一次 `eth_getBalance` JSON-RPC 调用，再把 wei 换算成 ether。

use crate::{
    config::EthereumConfig,
    error::AppError,
    models::balance::{BalanceResponse, RpcRequest, RpcResponse},
};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

/// `0x` 加 40 位十六进制数字（不校验大小写校验和）
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// wei 换算为 ether，精确十进制，去掉末尾的 0
pub fn wei_to_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let frac = wei % WEI_PER_ETHER;

    if frac == 0 {
        return whole.to_string();
    }

    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// 解析 JSON-RPC 返回的十六进制数量，例如 `0x1bc16d674ec80000`
///
/// 上限为 `u128::MAX` wei（约 3.4e20 ether）。超出上限按上游数据异常处理，
/// 返回 `Internal`（500），不会截断。
fn parse_quantity(raw: &str) -> Result<u128, AppError> {
    let digits = raw
        .strip_prefix("0x")
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::internal(format!("Malformed RPC quantity: {}", raw)))?;

    u128::from_str_radix(digits, 16)
        .map_err(|e| AppError::internal(format!("Malformed RPC quantity {}: {}", raw, e)))
}

pub struct EthereumClient {
    client: Client,
    rpc_url: Secret<String>,
}

impl EthereumClient {
    pub fn new(rpc_url: Secret<String>, request_timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build RPC client: {}", e)))?;

        Ok(Self { client, rpc_url })
    }

    pub fn from_config(config: &EthereumConfig) -> Result<Self, AppError> {
        let rpc_url = config
            .rpc_url
            .clone()
            .ok_or_else(|| AppError::Config("ethereum.rpc_url is not configured".to_string()))?;

        Self::new(rpc_url, Duration::from_secs(config.request_timeout_secs))
    }

    /// 查询地址余额
    ///
    /// 地址非法返回 `Validation`；传输、RPC 和结果解析错误都归为 `Internal`。
    pub async fn get_balance(&self, address: &str) -> Result<BalanceResponse, AppError> {
        if !is_valid_address(address) {
            return Err(AppError::validation("Invalid Ethereum address"));
        }

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_getBalance",
            params: [address, "latest"],
        };

        // 错误信息里不能带上 URL，它通常包含 API key
        let resp = self
            .client
            .post(self.rpc_url.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("RPC request failed: {}", e.without_url())))?;

        if !resp.status().is_success() {
            return Err(AppError::internal(format!("RPC endpoint returned {}", resp.status())));
        }

        let body: RpcResponse = resp
            .json()
            .await
            .map_err(|e| AppError::internal(format!("RPC response malformed: {}", e.without_url())))?;

        if let Some(err) = body.error {
            return Err(AppError::internal(format!(
                "RPC error {}: {}",
                err.code, err.message
            )));
        }

        let raw = body
            .result
            .ok_or_else(|| AppError::internal("RPC response has no result"))?;
        let wei = parse_quantity(&raw)?;

        tracing::debug!(%address, wei = %wei, "Balance retrieved");

        Ok(BalanceResponse {
            address: address.to_string(),
            balance: wei_to_ether(wei),
        })
    }
}
