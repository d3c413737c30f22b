use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// freee 連携状態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeeConnectionStatusDto {
   pub is_connected:     bool,
   pub company_id:       Option<i64>,
   pub company_name:     Option<String>,
   pub token_expires_at: Option<DateTime<Utc>>,
   pub last_sync_at:     Option<DateTime<Utc>>,
}

/// OAuth 開始レスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeeOAuthInitiateDto {
   pub auth_url: String,
   pub state:    String,
}

/// 接続テスト結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeeConnectionTestDto {
   pub success: bool,
   pub message: String,
}

/// freee 事業所
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeeCompanyDto {
   pub id:           i64,
   pub name:         String,
   pub display_name: Option<String>,
   pub role:         Option<String>,
}

// --- リクエスト型（Core Service 内部 API 用） ---

#[derive(Debug, Clone, Serialize)]
pub struct FreeeOAuthInitiateCoreRequest {
   pub user_id:      uuid::Uuid,
   pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FreeeOAuthCompleteCoreRequest {
   pub user_id: uuid::Uuid,
   pub code:    String,
   pub state:   String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FreeeSelectCompanyCoreRequest {
   pub user_id:    uuid::Uuid,
   pub company_id: i64,
}
