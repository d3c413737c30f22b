use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 同期実行結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResultDto {
   pub total_projects: u32,
   pub success_count:  u32,
   pub failure_count:  u32,
   pub skipped_count:  u32,
   pub start_time:     DateTime<Utc>,
   pub end_time:       DateTime<Utc>,
   #[serde(default)]
   pub errors:         Vec<String>,
}

/// 同期ステータス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStatusDto {
   pub is_running:         bool,
   pub last_sync_time:     Option<DateTime<Utc>>,
   pub next_scheduled_run: Option<DateTime<Utc>>,
   pub pending_count:      u32,
   pub failed_count:       u32,
}

/// 同期履歴エントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncHistoryEntryDto {
   pub id:             String,
   pub poc_project_id: String,
   pub project_name:   String,
   pub sync_type:      String,
   pub status:         String,
   pub error_message:  Option<String>,
   pub synced_at:      DateTime<Utc>,
}

/// 同期履歴の検索条件
///
/// `page` / `limit` はハンドラでデフォルト・上限適用済みの値。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncHistoryFilter {
   pub start_date: Option<DateTime<Utc>>,
   pub end_date:   Option<DateTime<Utc>>,
   pub status:     Option<String>,
   pub page:       u32,
   pub limit:      u32,
}

/// 同期設定
///
/// 取得レスポンスと更新リクエストの両方で使う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettingsDto {
   pub auto_sync_enabled:   bool,
   pub sync_interval_hours: u32,
   pub max_retry_attempts:  u32,
   pub notify_on_error:     bool,
   #[serde(default)]
   pub notification_emails: Vec<String>,
}

/// POC プロジェクト / 案件
///
/// Core Service 側のモデルをそのまま中継するため、構造は固定しない。
pub type PocProjectDto = serde_json::Value;

/// POC から作成・更新された案件
pub type ProjectDto = serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectFromPocCoreRequest {
   pub poc_project_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProjectFromPocCoreRequest {
   pub project_id:     String,
   pub poc_project_id: String,
}
