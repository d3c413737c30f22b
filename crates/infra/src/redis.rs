//! # Redis 接続管理
//!
//! `ConnectionManager` は内部で再接続を行い、`clone` で安価に共有できる。
//! セッション管理とログイン試行カウンタは同じ接続を共有する。

use redis::aio::ConnectionManager;

use crate::InfraError;

/// Redis 接続マネージャを作成する
///
/// # 引数
///
/// - `redis_url`: Redis 接続 URL（例: `redis://localhost:6379`）
pub async fn create_connection_manager(redis_url: &str) -> Result<ConnectionManager, InfraError> {
   let client = redis::Client::open(redis_url)?;
   let conn = ConnectionManager::new(client).await?;
   tracing::debug!("Redis に接続しました");
   Ok(conn)
}
