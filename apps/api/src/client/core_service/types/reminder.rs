use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 週報リマインド設定
///
/// 取得レスポンスと更新リクエストの両方で使う。
/// Core Service 側のデフォルトは有効・3 / 7 / 14 日・`09:00`・上長を含む。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderSettingsDto {
   pub enabled:              bool,
   pub first_reminder_days:  u32,
   pub second_reminder_days: u32,
   pub escalation_days:      u32,
   /// `HH:MM`（24 時間表記）
   pub reminder_time:        String,
   pub include_manager:      bool,
}

/// 本日のリマインド対象者
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderTargetDto {
   pub user_id:       Uuid,
   pub user_name:     String,
   pub user_email:    String,
   pub report_id:     Option<Uuid>,
   pub start_date:    NaiveDate,
   pub end_date:      NaiveDate,
   pub days_overdue:  u32,
   /// `first` / `second` / `escalation`
   pub reminder_type: String,
   pub manager_id:    Option<Uuid>,
   pub manager_email: Option<String>,
}

/// リマインド一括送信結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderResultDto {
   pub sent_count:  u32,
   pub error_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateReminderSettingsCoreRequest {
   pub updated_by: Uuid,
   #[serde(flatten)]
   pub settings:   ReminderSettingsDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOverdueRemindersCoreRequest {
   pub days: u32,
}
