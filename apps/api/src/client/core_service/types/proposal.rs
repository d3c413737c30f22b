use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// 提案ステータス
///
/// `pending` → `responded` → `proceed` / `declined`。`proposed` は提案直後の保存値で、
/// `pending` と同じく未回答を表す。遷移の可否は Core Service が判定する。
#[derive(
   Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProposalStatus {
   Proposed,
   Pending,
   Responded,
   Proceed,
   Declined,
}

/// 提案一覧の並び替えキー
#[derive(
   Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProposalSortBy {
   #[default]
   CreatedAt,
   UpdatedAt,
   RespondedAt,
}

/// 並び順
#[derive(
   Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
   Asc,
   #[default]
   Desc,
}

/// 提案一覧の要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalItemDto {
   pub id:                      Uuid,
   pub project_id:              Uuid,
   pub project_name:            String,
   pub status:                  ProposalStatus,
   pub proposed_at:             DateTime<Utc>,
   pub responded_at:            Option<DateTime<Utc>>,
   pub pending_questions_count: u32,
}

/// 提案詳細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalDetailDto {
   pub id:           Uuid,
   pub project_id:   Uuid,
   pub project_name: String,
   pub description:  Option<String>,
   pub status:       ProposalStatus,
   pub proposed_at:  DateTime<Utc>,
   pub responded_at: Option<DateTime<Utc>>,
   pub questions:    Vec<QuestionDto>,
}

/// 提案への質問
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDto {
   pub id:            Uuid,
   pub proposal_id:   Uuid,
   pub question_text: String,
   pub response_text: Option<String>,
   pub is_responded:  bool,
   pub asked_by:      Uuid,
   pub sales_user_id: Option<Uuid>,
   pub created_at:    DateTime<Utc>,
   pub responded_at:  Option<DateTime<Utc>>,
}

/// 提案統計・ダッシュボード
///
/// 集計項目は Core Service 側で定義されるため、構造は固定しない。
pub type ProposalSummaryDto = serde_json::Value;

// --- リクエスト型（Core Service 内部 API 用） ---

/// 提案一覧の検索条件（値はハンドラで検証・上限適用済み）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalListQuery {
   pub status:     Option<ProposalStatus>,
   pub page:       u32,
   pub limit:      u32,
   pub sort_by:    ProposalSortBy,
   pub sort_order: SortOrder,
}

/// ページ指定のみの検索条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
   pub page:  u32,
   pub limit: u32,
}

/// 提案統計の期間指定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalStatisticsQuery {
   pub start_date: Option<DateTime<Utc>>,
   pub end_date:   Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateProposalStatusCoreRequest {
   pub status: ProposalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTextCoreRequest {
   pub question_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondQuestionCoreRequest {
   pub response_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignQuestionCoreRequest {
   pub sales_user_id: Uuid,
}
