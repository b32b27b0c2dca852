//! 公共 API 目录服务
//!
//! 目录数据是一个不可变快照，刷新时整体替换（ArcSwap），读取方无锁。
//! 刷新失败时保留旧快照。

use crate::{
    config::CatalogConfig,
    error::AppError,
    models::catalog::{ApiEntry, CatalogPayload, CatalogQuery, CatalogResponse},
};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

/// 某一时刻拉取到的目录
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    pub entries: Vec<ApiEntry>,
    /// 从未成功拉取过时为 None
    pub fetched_at: Option<DateTime<Utc>>,
}

pub struct CatalogService {
    client: Client,
    source_url: String,
    refresh_interval: Option<Duration>,
    snapshot: ArcSwap<CatalogSnapshot>,
}

impl CatalogService {
    pub fn new(config: &CatalogConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build catalog client: {}", e)))?;

        Ok(Self {
            client,
            source_url: config.source_url.clone(),
            refresh_interval: (config.refresh_interval_secs > 0)
                .then(|| Duration::from_secs(config.refresh_interval_secs)),
            snapshot: ArcSwap::from_pointee(CatalogSnapshot::default()),
        })
    }

    /// 当前快照
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.load_full()
    }

    /// 直接替换快照
    pub fn replace(&self, entries: Vec<ApiEntry>) {
        self.snapshot.store(Arc::new(CatalogSnapshot {
            entries,
            fetched_at: Some(Utc::now()),
        }));
    }

    /// 拉取上游目录；失败时记录日志并保留旧快照
    pub async fn refresh(&self) -> Result<usize, AppError> {
        match self.fetch().await {
            Ok(entries) => {
                let count = entries.len();
                self.replace(entries);
                tracing::info!(count, "Catalog refreshed");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kept = self.snapshot.load().entries.len(),
                    "Catalog refresh failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<ApiEntry>, AppError> {
        let resp = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("Catalog request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AppError::internal(format!(
                "Catalog source returned {}",
                resp.status()
            )));
        }

        let payload: CatalogPayload = resp
            .json()
            .await
            .map_err(|e| AppError::internal(format!("Catalog payload malformed: {}", e)))?;

        Ok(payload.entries.unwrap_or_default())
    }

    /// 启动后台定时刷新；刷新间隔为 0 时不启动
    pub fn spawn_refresh_task(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let interval = self.refresh_interval?;
        let service = Arc::clone(self);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次 tick 立即返回，启动时已经拉取过
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let _ = service.refresh().await;
            }
        }))
    }

    /// 按分类（不区分大小写）过滤，再截取前 `limit` 条
    pub fn filter(&self, query: &CatalogQuery) -> Result<CatalogResponse, AppError> {
        let limit = parse_limit(query.limit.as_deref())?;
        let category = query.category.as_deref().filter(|c| !c.is_empty());

        let snapshot = self.snapshot.load();
        let entries: Vec<ApiEntry> = snapshot
            .entries
            .iter()
            .filter(|entry| category.map_or(true, |c| entry.category.to_lowercase() == c.to_lowercase()))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(CatalogResponse {
            count: entries.len(),
            entries,
        })
    }
}

/// 取开头的整数部分（`"1.5"` → 1，`"2abc"` → 2），空字符串视为未提供。
/// 没有数字或为负数时返回 400，超出 `usize` 时按上限处理。
fn parse_limit(raw: Option<&str>) -> Result<Option<usize>, AppError> {
    let s = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => return Ok(None),
        Some(s) => s,
    };
    let unsigned = s.strip_prefix('+').unwrap_or(s);
    let digits_len = unsigned
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Err(AppError::validation("Limit parameter must be a number"));
    }

    let limit = unsigned[..digits_len]
        .bytes()
        .fold(0usize, |acc, b| {
            acc.saturating_mul(10).saturating_add(usize::from(b - b'0'))
        });
    Ok(Some(limit))
}
