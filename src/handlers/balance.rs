//! 以太坊余额查询

use crate::{error::AppError, middleware::BalanceState, models::balance::BalanceResponse};
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// `GET /balance/{address}`
pub async fn get_balance(
    State(state): State<Arc<BalanceState>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let response = state.ethereum_client.get_balance(&address).await?;
    Ok(Json(response))
}
