use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 経費一覧 PDF の出力条件（Core Service 内部 API 用）
///
/// `limit` はハンドラで上限適用済みの値。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListPdfFilter {
   pub status:     Option<String>,
   pub start_date: Option<DateTime<Utc>>,
   pub end_date:   Option<DateTime<Utc>>,
   pub limit:      u32,
}
