//! POC 同期関連の Core Service クライアント

use async_trait::async_trait;
use kanri_shared::{ApiResponse, ListResponse};

use super::{
   client_impl::CoreServiceClientImpl,
   error::CoreServiceError,
   response::{handle_empty_response, handle_response},
   types::{
      CreateProjectFromPocCoreRequest,
      PocProjectDto,
      ProjectDto,
      SyncHistoryEntryDto,
      SyncHistoryFilter,
      SyncResultDto,
      SyncSettingsDto,
      SyncStatusDto,
      UpdateProjectFromPocCoreRequest,
   },
};
use crate::middleware::request_id::inject_request_id;

/// POC 同期関連の Core Service クライアントトレイト
///
/// スケジューリングとリトライは Core Service 側の責務。
#[async_trait]
pub trait CoreServicePocSyncClient: Send + Sync {
   /// 全 POC プロジェクトを同期する
   ///
   /// Core Service の `POST /internal/poc-sync/sync/all` を呼び出す。
   async fn sync_all_projects(&self) -> Result<ApiResponse<SyncResultDto>, CoreServiceError>;

   /// 指定した POC プロジェクトを同期する
   async fn sync_project_by_id(&self, poc_project_id: &str) -> Result<(), CoreServiceError>;

   /// 指定した POC プロジェクトを強制同期する（差分判定なし）
   async fn force_sync(&self, poc_project_id: &str) -> Result<(), CoreServiceError>;

   /// スケジュール同期を即時実行する
   async fn run_scheduled_sync(&self) -> Result<ApiResponse<SyncResultDto>, CoreServiceError>;

   /// 同期ステータスを取得する
   async fn get_sync_status(&self) -> Result<ApiResponse<SyncStatusDto>, CoreServiceError>;

   /// 未同期の POC プロジェクト一覧を取得する
   async fn get_unsynced_projects(
      &self,
   ) -> Result<ApiResponse<Vec<PocProjectDto>>, CoreServiceError>;

   /// 同期履歴を取得する
   ///
   /// Core Service の `GET /internal/poc-sync/history` を呼び出す。
   async fn get_sync_history(
      &self,
      filter: &SyncHistoryFilter,
   ) -> Result<ApiResponse<ListResponse<SyncHistoryEntryDto>>, CoreServiceError>;

   /// POC プロジェクトから案件を作成する
   async fn create_project_from_poc(
      &self,
      req: &CreateProjectFromPocCoreRequest,
   ) -> Result<ApiResponse<ProjectDto>, CoreServiceError>;

   /// POC プロジェクトの内容で既存案件を更新する
   async fn update_project_from_poc(
      &self,
      req: &UpdateProjectFromPocCoreRequest,
   ) -> Result<ApiResponse<ProjectDto>, CoreServiceError>;

   /// 同期設定を取得する
   async fn get_sync_settings(&self) -> Result<ApiResponse<SyncSettingsDto>, CoreServiceError>;

   /// 同期設定を更新する
   async fn update_sync_settings(
      &self,
      settings: &SyncSettingsDto,
   ) -> Result<(), CoreServiceError>;
}

#[async_trait]
impl CoreServicePocSyncClient for CoreServiceClientImpl {
   async fn sync_all_projects(&self) -> Result<ApiResponse<SyncResultDto>, CoreServiceError> {
      let url = self.url("/poc-sync/sync/all");

      let response = inject_request_id(self.client.post(&url)).send().await?;
      handle_response(response).await
   }

   async fn sync_project_by_id(&self, poc_project_id: &str) -> Result<(), CoreServiceError> {
      let url = self.url(&format!(
         "/poc-sync/sync/projects/{}",
         urlencoding::encode(poc_project_id)
      ));

      let response = inject_request_id(self.client.post(&url)).send().await?;
      handle_empty_response(response).await
   }

   async fn force_sync(&self, poc_project_id: &str) -> Result<(), CoreServiceError> {
      let url = self.url(&format!(
         "/poc-sync/sync/projects/{}/force",
         urlencoding::encode(poc_project_id)
      ));

      let response = inject_request_id(self.client.post(&url)).send().await?;
      handle_empty_response(response).await
   }

   async fn run_scheduled_sync(&self) -> Result<ApiResponse<SyncResultDto>, CoreServiceError> {
      let url = self.url("/poc-sync/sync/scheduled");

      let response = inject_request_id(self.client.post(&url)).send().await?;
      handle_response(response).await
   }

   async fn get_sync_status(&self) -> Result<ApiResponse<SyncStatusDto>, CoreServiceError> {
      let url = self.url("/poc-sync/status");

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn get_unsynced_projects(
      &self,
   ) -> Result<ApiResponse<Vec<PocProjectDto>>, CoreServiceError> {
      let url = self.url("/poc-sync/unsynced");

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn get_sync_history(
      &self,
      filter: &SyncHistoryFilter,
   ) -> Result<ApiResponse<ListResponse<SyncHistoryEntryDto>>, CoreServiceError> {
      let url = self.url("/poc-sync/history");

      let response = inject_request_id(self.client.get(&url))
         .query(filter)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn create_project_from_poc(
      &self,
      req: &CreateProjectFromPocCoreRequest,
   ) -> Result<ApiResponse<ProjectDto>, CoreServiceError> {
      let url = self.url("/poc-sync/projects");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn update_project_from_poc(
      &self,
      req: &UpdateProjectFromPocCoreRequest,
   ) -> Result<ApiResponse<ProjectDto>, CoreServiceError> {
      let url = self.url(&format!(
         "/poc-sync/projects/{}",
         urlencoding::encode(&req.project_id)
      ));

      let response = inject_request_id(self.client.put(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_sync_settings(&self) -> Result<ApiResponse<SyncSettingsDto>, CoreServiceError> {
      let url = self.url("/poc-sync/settings");

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn update_sync_settings(
      &self,
      settings: &SyncSettingsDto,
   ) -> Result<(), CoreServiceError> {
      let url = self.url("/poc-sync/settings");

      let response = inject_request_id(self.client.put(&url))
         .json(settings)
         .send()
         .await?;
      handle_empty_response(response).await
   }
}
