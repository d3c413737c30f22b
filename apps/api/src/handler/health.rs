//! # ヘルスチェックハンドラ
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（Redis / Core Service の接続状態を確認）

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kanri_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
use redis::aio::ConnectionManager;

/// 依存先チェックのタイムアウト
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
   Json(HealthResponse {
      status:  "healthy".to_string(),
      version: env!("CARGO_PKG_VERSION").to_string(),
   })
}

/// Readiness Check 用の State
pub struct ReadinessState {
   pub redis_conn:       ConnectionManager,
   pub core_service_url: String,
   pub http_client:      reqwest::Client,
}

/// GET /health/ready
///
/// Redis と Core Service を並行してチェックする。
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
   let (redis_status, core_status) = tokio::join!(
      check_redis(state.redis_conn.clone()),
      check_core_service(&state.http_client, &state.core_service_url),
   );

   let response = ReadinessResponse::from_checks(HashMap::from([
      ("redis".to_string(), redis_status),
      ("core_service".to_string(), core_status),
   ]));
   let http_status = match response.status {
      ReadinessStatus::Ready => StatusCode::OK,
      ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
   };

   (http_status, Json(response))
}

/// Redis への接続を PING で確認する
async fn check_redis(mut conn: ConnectionManager) -> CheckStatus {
   match tokio::time::timeout(
      CHECK_TIMEOUT,
      redis::cmd("PING").query_async::<String>(&mut conn),
   )
   .await
   {
      Ok(Ok(_)) => CheckStatus::Ok,
      Ok(Err(e)) => {
         tracing::warn!(error = %e, "readiness check: redis ping failed");
         CheckStatus::Error
      }
      Err(_) => {
         tracing::warn!("readiness check: redis check timed out");
         CheckStatus::Error
      }
   }
}

/// Core Service の `/health` が 2xx を返すか確認する
async fn check_core_service(client: &reqwest::Client, base_url: &str) -> CheckStatus {
   let url = format!("{base_url}/health");
   match tokio::time::timeout(CHECK_TIMEOUT, client.get(&url).send()).await {
      Ok(Ok(response)) if response.status().is_success() => CheckStatus::Ok,
      Ok(Ok(response)) => {
         tracing::warn!(status = %response.status(), "readiness check: core service unhealthy");
         CheckStatus::Error
      }
      Ok(Err(e)) => {
         tracing::warn!(error = %e, "readiness check: core service request failed");
         CheckStatus::Error
      }
      Err(_) => {
         tracing::warn!("readiness check: core service check timed out");
         CheckStatus::Error
      }
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[tokio::test]
   async fn test_health_checkはhealthyとクレートのバージョンを返す() {
      let Json(response) = health_check().await;

      assert_eq!(response.status, "healthy");
      assert_eq!(response.version, env!("CARGO_PKG_VERSION"));
   }

   #[tokio::test]
   async fn test_core_serviceに接続できなければerror() {
      // ポート 9 (discard) は通常閉じている
      let status = check_core_service(&reqwest::Client::new(), "http://127.0.0.1:9").await;

      assert_eq!(status, CheckStatus::Error);
   }
}
