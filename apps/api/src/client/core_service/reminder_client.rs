//! 週報リマインド関連の Core Service クライアント

use async_trait::async_trait;
use kanri_shared::ApiResponse;

use super::{
   client_impl::CoreServiceClientImpl,
   error::CoreServiceError,
   response::{handle_empty_response, handle_response},
   types::{
      ReminderResultDto,
      ReminderSettingsDto,
      ReminderTargetDto,
      SendOverdueRemindersCoreRequest,
      UpdateReminderSettingsCoreRequest,
   },
};
use crate::middleware::request_id::inject_request_id;

/// 週報リマインド関連の Core Service クライアントトレイト
///
/// 送信スケジュールとメール配信は Core Service 側の責務。
#[async_trait]
pub trait CoreServiceReminderClient: Send + Sync {
   /// リマインド設定を取得する
   ///
   /// Core Service の `GET /internal/weekly-reports/reminder-settings` を呼び出す。
   async fn get_reminder_settings(
      &self,
   ) -> Result<ApiResponse<ReminderSettingsDto>, CoreServiceError>;

   /// リマインド設定を更新する
   async fn update_reminder_settings(
      &self,
      req: &UpdateReminderSettingsCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// 本日のリマインド対象者を取得する
   async fn get_todays_reminders(
      &self,
   ) -> Result<ApiResponse<Vec<ReminderTargetDto>>, CoreServiceError>;

   /// 本日のリマインドを送信する
   async fn send_reminders(&self) -> Result<ApiResponse<ReminderResultDto>, CoreServiceError>;

   /// 指定日数以上提出が遅れている週報のリマインドを送信する
   async fn send_overdue_reminders(
      &self,
      req: &SendOverdueRemindersCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// 上長へのエスカレーションを実行する
   async fn process_escalations(&self) -> Result<(), CoreServiceError>;
}

#[async_trait]
impl CoreServiceReminderClient for CoreServiceClientImpl {
   async fn get_reminder_settings(
      &self,
   ) -> Result<ApiResponse<ReminderSettingsDto>, CoreServiceError> {
      let url = self.url("/weekly-reports/reminder-settings");

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn update_reminder_settings(
      &self,
      req: &UpdateReminderSettingsCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url("/weekly-reports/reminder-settings");

      let response = inject_request_id(self.client.put(&url))
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn get_todays_reminders(
      &self,
   ) -> Result<ApiResponse<Vec<ReminderTargetDto>>, CoreServiceError> {
      let url = self.url("/weekly-reports/reminders/today");

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn send_reminders(&self) -> Result<ApiResponse<ReminderResultDto>, CoreServiceError> {
      let url = self.url("/weekly-reports/reminders/send");

      let response = inject_request_id(self.client.post(&url)).send().await?;
      handle_response(response).await
   }

   async fn send_overdue_reminders(
      &self,
      req: &SendOverdueRemindersCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url("/weekly-reports/reminders/overdue");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn process_escalations(&self) -> Result<(), CoreServiceError> {
      let url = self.url("/weekly-reports/reminders/escalations");

      let response = inject_request_id(self.client.post(&url)).send().await?;
      handle_empty_response(response).await
   }
}
