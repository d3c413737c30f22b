use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 営業チームメンバー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTeamMemberDto {
   pub id:          String,
   pub user_id:     String,
   /// `manager` / `member` など
   pub team_role:   String,
   pub is_active:   bool,
   pub joined_at:   DateTime<Utc>,
   pub left_at:     Option<DateTime<Utc>>,
   pub permissions: Vec<String>,
   pub created_by:  String,
   pub updated_by:  String,
   pub created_at:  DateTime<Utc>,
   pub updated_at:  DateTime<Utc>,
}

/// 営業チーム統計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTeamStatisticsDto {
   pub total_members:     u32,
   pub active_members:    u32,
   pub inactive_members:  u32,
   pub role_distribution: HashMap<String, u32>,
   pub recent_joins:      Vec<SalesTeamMemberDto>,
   pub recent_leaves:     Vec<SalesTeamMemberDto>,
}

/// メンバー一覧の検索条件（値はハンドラで上限適用済み）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTeamMemberFilter {
   pub team_role: Option<String>,
   pub is_active: Option<bool>,
   pub page:      u32,
   pub limit:     u32,
}

// --- リクエスト型 ---
//
// クライアントから受け取った JSON をそのまま Core Service に転送する。

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSalesTeamMemberRequest {
   pub user_id:     String,
   pub team_role:   String,
   #[serde(default)]
   pub permissions: Vec<String>,
   pub created_by:  String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSalesTeamMemberRequest {
   #[serde(default)]
   pub team_role:   Option<String>,
   #[serde(default)]
   pub permissions: Option<Vec<String>>,
   pub updated_by:  String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberActorCoreRequest {
   /// 操作の実行者（削除者・アクティブ化実行者など）
   pub actor: String,
}
