//! # ヘルスチェック共通型
//!
//! `/health` と `/health/ready` が返すレスポンス型を提供する。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
///
/// `status` はサービスの稼働状態、`version` は Cargo.toml のバージョンを示す。
///
/// ## 使用例
///
/// ```
/// use kanri_shared::HealthResponse;
///
/// let response = HealthResponse {
///     status:  "healthy".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(response.status, "healthy");
/// ```
#[derive(Debug, Serialize)]
pub struct HealthResponse {
   /// 稼働状態（`"healthy"` または `"unhealthy"`）
   pub status:  String,
   /// アプリケーションバージョン
   pub version: String,
}

/// 個別チェックの結果ステータス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
   Ok,
   Error,
}

/// Readiness 全体のステータス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
   /// 全依存先が利用可能
   Ready,
   /// 一部の依存先が利用不可
   NotReady,
}

/// Readiness Check レスポンス
///
/// `checks` のキーはチェック名（`"redis"`, `"core_service"`）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
   pub status: ReadinessStatus,
   pub checks: HashMap<String, CheckStatus>,
}

impl ReadinessResponse {
   /// 個別チェック結果から全体ステータスを決定する
   pub fn from_checks(checks: HashMap<String, CheckStatus>) -> Self {
      let status = if checks.values().all(|s| *s == CheckStatus::Ok) {
         ReadinessStatus::Ready
      } else {
         ReadinessStatus::NotReady
      };
      Self { status, checks }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_health_responseのserializeで正しいjson形状にする() {
      let response = HealthResponse {
         status:  "healthy".to_string(),
         version: "0.1.0".to_string(),
      };
      let json = serde_json::to_value(&response).unwrap();

      assert_eq!(
         json,
         serde_json::json!({
            "status": "healthy",
            "version": "0.1.0"
         })
      );
   }

   #[test]
   fn test_readiness_status_not_readyのserialize結果() {
      let json = serde_json::to_value(ReadinessStatus::NotReady).unwrap();
      assert_eq!(json, serde_json::json!("not_ready"));
   }

   #[test]
   fn test_from_checks_全てokならready() {
      let checks = HashMap::from([
         ("redis".to_string(), CheckStatus::Ok),
         ("core_service".to_string(), CheckStatus::Ok),
      ]);

      assert_eq!(
         ReadinessResponse::from_checks(checks).status,
         ReadinessStatus::Ready
      );
   }

   #[test]
   fn test_from_checks_一つでもerrorならnot_ready() {
      let checks = HashMap::from([
         ("redis".to_string(), CheckStatus::Ok),
         ("core_service".to_string(), CheckStatus::Error),
      ]);
      let json = serde_json::to_value(ReadinessResponse::from_checks(checks)).unwrap();

      assert_eq!(json["status"], "not_ready");
      assert_eq!(json["checks"]["core_service"], "error");
   }
}
