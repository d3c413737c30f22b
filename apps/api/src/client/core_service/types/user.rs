use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ユーザー情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
   pub id:              Uuid,
   pub email:           String,
   pub first_name:      String,
   pub last_name:       String,
   pub first_name_kana: Option<String>,
   pub last_name_kana:  Option<String>,
   pub phone_number:    Option<String>,
   /// `admin` / `manager` / `sales` / `accounting` / `engineer` など
   pub role:            String,
   pub active:          bool,
   pub created_at:      DateTime<Utc>,
   pub updated_at:      DateTime<Utc>,
}

impl UserDto {
   /// 表示名（姓 名）
   pub fn display_name(&self) -> String {
      format!("{} {}", self.last_name, self.first_name)
   }
}

// --- リクエスト型（Core Service 内部 API 用） ---

#[derive(Debug, Clone, Serialize)]
pub struct VerifyCredentialsCoreRequest {
   pub email:    String,
   pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserCoreRequest {
   pub email:           String,
   pub password:        String,
   pub first_name:      String,
   pub last_name:       String,
   pub first_name_kana: Option<String>,
   pub last_name_kana:  Option<String>,
   pub phone_number:    Option<String>,
   pub role:            Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserCoreRequest {
   pub first_name:      Option<String>,
   pub last_name:       Option<String>,
   pub first_name_kana: Option<String>,
   pub last_name_kana:  Option<String>,
   pub phone_number:    Option<String>,
   pub role:            Option<String>,
   pub active:          Option<bool>,
}
