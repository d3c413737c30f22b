//! # 週報リマインドハンドラ
//!
//! 管理者（`admin` ロール）向けの週報リマインド設定・送信のエンドポイント。
//! 送信タイミングの判定と実際の送信は Core Service が行う。
//!
//! 設定更新では日数の大小関係と時刻表記をここで検証し、
//! 不正な設定が Core Service に届かないようにする。

use std::sync::{Arc, LazyLock};

use axum::{
   Extension,
   Json,
   extract::{State, rejection::JsonRejection},
   response::{IntoResponse, Response},
};
use itertools::Itertools;
use kanri_shared::ListResponse;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::{
   client::{
      CoreServiceReminderClient,
      core_service::{
         ReminderSettingsDto,
         SendOverdueRemindersCoreRequest,
         UpdateReminderSettingsCoreRequest,
      },
   },
   error::{
      INVALID_REQUEST_MESSAGE,
      bad_request_response,
      message_response,
      not_implemented_response,
      service_error_response,
      unauthorized_response,
      validation_errors_response,
   },
   middleware::CurrentUser,
};

/// `HH:MM`（24 時間表記）
static REMINDER_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("リマインド時刻の正規表現が不正です")
});

/// 週報リマインド API の共有状態
pub struct ReminderState {
   pub core_service_client: Arc<dyn CoreServiceReminderClient>,
}

// --- リクエスト型 ---

#[derive(Debug, Deserialize)]
pub struct UpdateReminderSettingsRequest {
   pub enabled:              bool,
   pub first_reminder_days:  u32,
   pub second_reminder_days: u32,
   pub escalation_days:      u32,
   pub reminder_time:        String,
   #[serde(default)]
   pub include_manager:      bool,
}

impl UpdateReminderSettingsRequest {
   /// `0 < first < second < escalation` と時刻表記を確認する
   fn check(&self) -> Result<(), &'static str> {
      if self.first_reminder_days == 0 {
         return Err("初回リマインド日数は1以上で指定してください");
      }
      let strictly_increasing = [
         self.first_reminder_days,
         self.second_reminder_days,
         self.escalation_days,
      ]
      .into_iter()
      .tuple_windows()
      .all(|(a, b)| a < b);
      if !strictly_increasing {
         return Err("リマインド日数は初回、2回目、エスカレーションの順に大きくしてください");
      }
      if !REMINDER_TIME_PATTERN.is_match(&self.reminder_time) {
         return Err("リマインド時刻はHH:MM形式で指定してください");
      }
      Ok(())
   }
}

impl From<UpdateReminderSettingsRequest> for ReminderSettingsDto {
   fn from(req: UpdateReminderSettingsRequest) -> Self {
      Self {
         enabled:              req.enabled,
         first_reminder_days:  req.first_reminder_days,
         second_reminder_days: req.second_reminder_days,
         escalation_days:      req.escalation_days,
         reminder_time:        req.reminder_time,
         include_manager:      req.include_manager,
      }
   }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendOverdueRemindersRequest {
   #[validate(range(min = 1, message = "日数は1以上で指定してください"))]
   pub days: u32,
}

// --- ハンドラ ---

/// GET /api/v1/admin/weekly-reports/reminder-settings
pub async fn get_reminder_settings(State(state): State<Arc<ReminderState>>) -> Response {
   match state.core_service_client.get_reminder_settings().await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response("リマインド設定取得", "リマインド設定の取得に失敗しました", e),
   }
}

/// PUT /api/v1/admin/weekly-reports/reminder-settings
pub async fn update_reminder_settings(
   State(state): State<Arc<ReminderState>>,
   current_user: Option<Extension<CurrentUser>>,
   payload: Result<Json<UpdateReminderSettingsRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(message) = req.check() {
      tracing::debug!("リマインド設定更新: 入力エラー: {}", message);
      return bad_request_response(message);
   }

   let core_req = UpdateReminderSettingsCoreRequest {
      updated_by: user.user_id,
      settings:   req.into(),
   };
   match state
      .core_service_client
      .update_reminder_settings(&core_req)
      .await
   {
      Ok(()) => message_response("リマインド設定を更新しました"),
      Err(e) => service_error_response(
         &format!("リマインド設定更新(updated_by={})", user.user_id),
         "リマインド設定の更新に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/admin/weekly-reports/reminders/today
pub async fn get_todays_reminders(State(state): State<Arc<ReminderState>>) -> Response {
   match state.core_service_client.get_todays_reminders().await {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         "本日のリマインド対象取得",
         "リマインド対象者の取得に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/admin/weekly-reports/reminders/send
pub async fn send_reminders(State(state): State<Arc<ReminderState>>) -> Response {
   match state.core_service_client.send_reminders().await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response("リマインド送信", "リマインドの送信に失敗しました", e),
   }
}

/// POST /api/v1/admin/weekly-reports/reminders/overdue
pub async fn send_overdue_reminders(
   State(state): State<Arc<ReminderState>>,
   payload: Result<Json<SendOverdueRemindersRequest>, JsonRejection>,
) -> Response {
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(errors) = req.validate() {
      return validation_errors_response(&errors);
   }

   let core_req = SendOverdueRemindersCoreRequest { days: req.days };
   match state
      .core_service_client
      .send_overdue_reminders(&core_req)
      .await
   {
      Ok(()) => message_response("リマインドを送信しました"),
      Err(e) => service_error_response(
         &format!("未提出リマインド送信(days={})", req.days),
         "リマインドの送信に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/admin/weekly-reports/reminders/escalations
pub async fn process_escalations(State(state): State<Arc<ReminderState>>) -> Response {
   match state.core_service_client.process_escalations().await {
      Ok(()) => message_response("エスカレーションを実行しました"),
      Err(e) => service_error_response(
         "エスカレーション実行",
         "エスカレーションの実行に失敗しました",
         e,
      ),
   }
}

// --- 承認催促（準備中） ---

/// `/api/v1/admin/approval-reminder/*`
pub async fn approval_reminder_not_implemented() -> impl IntoResponse {
   not_implemented_response("承認催促機能は現在準備中です")
}
