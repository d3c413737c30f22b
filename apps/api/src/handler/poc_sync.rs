//! # POC 同期ハンドラ
//!
//! POC（外部案件管理）のプロジェクトを案件として取り込む同期操作のエンドポイント。
//! 同期の実行・スケジューリング・リトライは Core Service の責務で、
//! ここでは入力の構造チェックと結果の中継のみ行う。
//!
//! ## エンドポイント
//!
//! - `POST /api/v1/sales/poc-sync/sync/all` - 全プロジェクト同期
//! - `POST /api/v1/sales/poc-sync/sync/projects/{id}` - 個別同期
//! - `POST /api/v1/sales/poc-sync/sync/projects/{id}/force` - 強制同期
//! - `POST /api/v1/sales/poc-sync/sync/scheduled` - スケジュール同期の即時実行
//! - `GET /api/v1/sales/poc-sync/status` - 同期ステータス
//! - `GET /api/v1/sales/poc-sync/unsynced` - 未同期プロジェクト一覧
//! - `GET /api/v1/sales/poc-sync/history` - 同期履歴
//! - `POST /api/v1/sales/poc-sync/projects` - POC から案件作成
//! - `PUT /api/v1/sales/poc-sync/projects/{id}` - POC の内容で案件更新
//! - `GET`/`PUT /api/v1/sales/poc-sync/settings` - 同期設定

use std::sync::Arc;

use axum::{
   Json,
   extract::{Path, Query, State, rejection::JsonRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use kanri_shared::{ListResponse, PageResponse};
use serde::Deserialize;
use validator::Validate;

use crate::{
   client::{
      CoreServicePocSyncClient,
      core_service::{
         CreateProjectFromPocCoreRequest,
         SyncHistoryFilter,
         SyncSettingsDto,
         UpdateProjectFromPocCoreRequest,
      },
   },
   error::{
      INVALID_REQUEST_MESSAGE,
      bad_request_response,
      message_response,
      service_error_response,
      validation_errors_response,
   },
   params::{Pagination, non_blank, parse_rfc3339},
};

const POC_PROJECT_ID_REQUIRED: &str = "POCプロジェクトIDが必要です";

/// POC 同期 API の共有状態
pub struct PocSyncState {
   pub core_service_client: Arc<dyn CoreServicePocSyncClient>,
}

// --- リクエスト型 ---

/// 同期履歴のクエリ
#[derive(Debug, Default, Deserialize)]
pub struct SyncHistoryQuery {
   pub start_date: Option<String>,
   pub end_date:   Option<String>,
   pub status:     Option<String>,
   pub page:       Option<String>,
   pub limit:      Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PocProjectRequest {
   #[serde(default)]
   pub poc_project_id: String,
}

/// 同期設定の更新リクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSyncSettingsRequest {
   pub auto_sync_enabled:   bool,
   #[validate(range(min = 1, message = "同期間隔は1時間以上で指定してください"))]
   pub sync_interval_hours: u32,
   #[validate(range(max = 10, message = "最大リトライ回数は10回以下で指定してください"))]
   pub max_retry_attempts:  u32,
   pub notify_on_error:     bool,
   #[serde(default)]
   pub notification_emails: Vec<String>,
}

impl From<UpdateSyncSettingsRequest> for SyncSettingsDto {
   fn from(req: UpdateSyncSettingsRequest) -> Self {
      Self {
         auto_sync_enabled:   req.auto_sync_enabled,
         sync_interval_hours: req.sync_interval_hours,
         max_retry_attempts:  req.max_retry_attempts,
         notify_on_error:     req.notify_on_error,
         notification_emails: req.notification_emails,
      }
   }
}

// --- 同期実行 ---

/// POST /api/v1/sales/poc-sync/sync/all
pub async fn sync_all_projects(State(state): State<Arc<PocSyncState>>) -> Response {
   match state.core_service_client.sync_all_projects().await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response("全POCプロジェクト同期", "プロジェクトの同期に失敗しました", e),
   }
}

/// POST /api/v1/sales/poc-sync/sync/projects/{id}
pub async fn sync_project_by_id(
   State(state): State<Arc<PocSyncState>>,
   Path(id): Path<String>,
) -> Response {
   let Some(poc_project_id) = non_blank(Some(id.as_str())) else {
      return bad_request_response(POC_PROJECT_ID_REQUIRED);
   };

   match state
      .core_service_client
      .sync_project_by_id(poc_project_id)
      .await
   {
      Ok(()) => message_response("同期が完了しました"),
      Err(e) => service_error_response(
         &format!("POCプロジェクト同期(poc_project_id={poc_project_id})"),
         "プロジェクトの同期に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/sales/poc-sync/sync/projects/{id}/force
pub async fn force_sync(
   State(state): State<Arc<PocSyncState>>,
   Path(id): Path<String>,
) -> Response {
   let Some(poc_project_id) = non_blank(Some(id.as_str())) else {
      return bad_request_response(POC_PROJECT_ID_REQUIRED);
   };

   match state.core_service_client.force_sync(poc_project_id).await {
      Ok(()) => message_response("強制同期が完了しました"),
      Err(e) => service_error_response(
         &format!("POCプロジェクト強制同期(poc_project_id={poc_project_id})"),
         "強制同期に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/sales/poc-sync/sync/scheduled
///
/// 管理画面のバッチ実行（`/api/v1/admin/sales/batch/poc-sync/scheduled`）からも呼ばれる。
pub async fn run_scheduled_sync(State(state): State<Arc<PocSyncState>>) -> Response {
   match state.core_service_client.run_scheduled_sync().await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response("スケジュール同期", "スケジュール同期の実行に失敗しました", e),
   }
}

// --- 参照 ---

/// GET /api/v1/sales/poc-sync/status
pub async fn get_sync_status(State(state): State<Arc<PocSyncState>>) -> Response {
   match state.core_service_client.get_sync_status().await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response("同期ステータス取得", "同期ステータスの取得に失敗しました", e),
   }
}

/// GET /api/v1/sales/poc-sync/unsynced
pub async fn get_unsynced_projects(State(state): State<Arc<PocSyncState>>) -> Response {
   match state.core_service_client.get_unsynced_projects().await {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         "未同期プロジェクト取得",
         "未同期プロジェクトの取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/poc-sync/history
///
/// `start_date` / `end_date` は RFC3339。
pub async fn get_sync_history(
   State(state): State<Arc<PocSyncState>>,
   Query(query): Query<SyncHistoryQuery>,
) -> Response {
   let Ok(start_date) = parse_rfc3339(query.start_date.as_deref()) else {
      return bad_request_response("開始日時の形式が不正です");
   };
   let Ok(end_date) = parse_rfc3339(query.end_date.as_deref()) else {
      return bad_request_response("終了日時の形式が不正です");
   };
   let pagination = Pagination::standard(query.page.as_deref(), query.limit.as_deref());

   let filter = SyncHistoryFilter {
      start_date,
      end_date,
      status: non_blank(query.status.as_deref()).map(str::to_string),
      page: pagination.page,
      limit: pagination.limit,
   };
   match state.core_service_client.get_sync_history(&filter).await {
      Ok(core_response) => {
         let list = core_response.data;
         Json(PageResponse::new(
            list.items,
            list.total,
            pagination.page,
            pagination.limit,
         ))
         .into_response()
      }
      Err(e) => service_error_response("同期履歴取得", "同期履歴の取得に失敗しました", e),
   }
}

// --- 案件の作成・更新 ---

/// POST /api/v1/sales/poc-sync/projects
pub async fn create_project_from_poc(
   State(state): State<Arc<PocSyncState>>,
   payload: Result<Json<PocProjectRequest>, JsonRejection>,
) -> Response {
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   let Some(poc_project_id) = non_blank(Some(req.poc_project_id.as_str())) else {
      return bad_request_response(POC_PROJECT_ID_REQUIRED);
   };

   let core_req = CreateProjectFromPocCoreRequest {
      poc_project_id: poc_project_id.to_string(),
   };
   match state.core_service_client.create_project_from_poc(&core_req).await {
      Ok(core_response) => (StatusCode::CREATED, Json(core_response.data)).into_response(),
      Err(e) => service_error_response(
         &format!("POCから案件作成(poc_project_id={poc_project_id})"),
         "案件の作成に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/sales/poc-sync/projects/{id}
pub async fn update_project_from_poc(
   State(state): State<Arc<PocSyncState>>,
   Path(project_id): Path<String>,
   payload: Result<Json<PocProjectRequest>, JsonRejection>,
) -> Response {
   let Some(project_id) = non_blank(Some(project_id.as_str())) else {
      return bad_request_response("案件IDが必要です");
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   let Some(poc_project_id) = non_blank(Some(req.poc_project_id.as_str())) else {
      return bad_request_response(POC_PROJECT_ID_REQUIRED);
   };

   let core_req = UpdateProjectFromPocCoreRequest {
      project_id:     project_id.to_string(),
      poc_project_id: poc_project_id.to_string(),
   };
   match state.core_service_client.update_project_from_poc(&core_req).await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("POCから案件更新(project_id={project_id}, poc_project_id={poc_project_id})"),
         "案件の更新に失敗しました",
         e,
      ),
   }
}

// --- 設定 ---

/// GET /api/v1/sales/poc-sync/settings
pub async fn get_sync_settings(State(state): State<Arc<PocSyncState>>) -> Response {
   match state.core_service_client.get_sync_settings().await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response("同期設定取得", "同期設定の取得に失敗しました", e),
   }
}

/// PUT /api/v1/sales/poc-sync/settings
pub async fn update_sync_settings(
   State(state): State<Arc<PocSyncState>>,
   payload: Result<Json<UpdateSyncSettingsRequest>, JsonRejection>,
) -> Response {
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(errors) = req.validate() {
      tracing::debug!("同期設定更新: 入力エラー: {}", errors);
      return validation_errors_response(&errors);
   }

   let settings = SyncSettingsDto::from(req);
   match state.core_service_client.update_sync_settings(&settings).await {
      Ok(()) => message_response("同期設定を更新しました"),
      Err(e) => service_error_response("同期設定更新", "同期設定の更新に失敗しました", e),
   }
}

#[cfg(test)]
mod tests {
   use std::sync::{
      Mutex,
      atomic::{AtomicUsize, Ordering},
   };

   use async_trait::async_trait;
   use axum::{
      Router,
      body::Body,
      http::{Method, Request},
      routing::{get, post, put},
   };
   use chrono::{TimeZone, Utc};
   use kanri_shared::{ApiResponse, ErrorResponse, MessageResponse};
   use pretty_assertions::assert_eq;
   use rstest::rstest;
   use serde_json::json;
   use tower::ServiceExt;

   use super::*;
   use crate::client::{
      CoreServiceError,
      core_service::{
         PocProjectDto,
         ProjectDto,
         SyncHistoryEntryDto,
         SyncResultDto,
         SyncStatusDto,
      },
   };

   #[derive(Default)]
   struct StubPocSyncClient {
      calls:          AtomicUsize,
      last_filter:    Mutex<Option<SyncHistoryFilter>>,
      last_settings:  Mutex<Option<SyncSettingsDto>>,
      last_synced_id: Mutex<Option<String>>,
      fail_force:     bool,
   }

   impl StubPocSyncClient {
      fn calls(&self) -> usize {
         self.calls.load(Ordering::SeqCst)
      }

      fn record(&self) {
         self.calls.fetch_add(1, Ordering::SeqCst);
      }
   }

   fn sync_result() -> SyncResultDto {
      SyncResultDto {
         total_projects: 3,
         success_count:  2,
         failure_count:  1,
         skipped_count:  0,
         start_time:     Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
         end_time:       Utc.with_ymd_and_hms(2024, 4, 1, 0, 5, 0).unwrap(),
         errors:         vec!["poc-3: timeout".to_string()],
      }
   }

   #[async_trait]
   impl CoreServicePocSyncClient for StubPocSyncClient {
      async fn sync_all_projects(&self) -> Result<ApiResponse<SyncResultDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(sync_result()))
      }

      async fn sync_project_by_id(&self, poc_project_id: &str) -> Result<(), CoreServiceError> {
         self.record();
         *self.last_synced_id.lock().unwrap() = Some(poc_project_id.to_string());
         Ok(())
      }

      async fn force_sync(&self, _poc_project_id: &str) -> Result<(), CoreServiceError> {
         self.record();
         if self.fail_force {
            return Err(CoreServiceError::Network("connection reset".to_string()));
         }
         Ok(())
      }

      async fn run_scheduled_sync(&self) -> Result<ApiResponse<SyncResultDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(sync_result()))
      }

      async fn get_sync_status(&self) -> Result<ApiResponse<SyncStatusDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(SyncStatusDto {
            is_running:         false,
            last_sync_time:     None,
            next_scheduled_run: None,
            pending_count:      0,
            failed_count:       0,
         }))
      }

      async fn get_unsynced_projects(
         &self,
      ) -> Result<ApiResponse<Vec<PocProjectDto>>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(vec![
            json!({"id": "poc-1", "title": "在庫管理システム刷新"}),
            json!({"id": "poc-2", "title": "勤怠アプリ保守"}),
         ]))
      }

      async fn get_sync_history(
         &self,
         filter: &SyncHistoryFilter,
      ) -> Result<ApiResponse<ListResponse<SyncHistoryEntryDto>>, CoreServiceError> {
         self.record();
         *self.last_filter.lock().unwrap() = Some(filter.clone());
         Ok(ApiResponse::new(ListResponse {
            items: vec![SyncHistoryEntryDto {
               id:             "h-1".to_string(),
               poc_project_id: "poc-1".to_string(),
               project_name:   "在庫管理システム刷新".to_string(),
               sync_type:      "manual".to_string(),
               status:         "success".to_string(),
               error_message:  None,
               synced_at:      Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            }],
            total: 41,
         }))
      }

      async fn create_project_from_poc(
         &self,
         req: &CreateProjectFromPocCoreRequest,
      ) -> Result<ApiResponse<ProjectDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(json!({
            "id": "prj-1",
            "poc_project_id": req.poc_project_id,
            "project_name": "在庫管理システム刷新",
         })))
      }

      async fn update_project_from_poc(
         &self,
         req: &UpdateProjectFromPocCoreRequest,
      ) -> Result<ApiResponse<ProjectDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(json!({
            "id": req.project_id,
            "poc_project_id": req.poc_project_id,
         })))
      }

      async fn get_sync_settings(&self) -> Result<ApiResponse<SyncSettingsDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(SyncSettingsDto {
            auto_sync_enabled:   true,
            sync_interval_hours: 24,
            max_retry_attempts:  3,
            notify_on_error:     true,
            notification_emails: vec![],
         }))
      }

      async fn update_sync_settings(
         &self,
         settings: &SyncSettingsDto,
      ) -> Result<(), CoreServiceError> {
         self.record();
         *self.last_settings.lock().unwrap() = Some(settings.clone());
         Ok(())
      }
   }

   fn create_test_app(client: Arc<StubPocSyncClient>) -> Router {
      let state = Arc::new(PocSyncState {
         core_service_client: client,
      });
      Router::new()
         .route("/sync/all", post(sync_all_projects))
         .route("/sync/projects/{id}", post(sync_project_by_id))
         .route("/sync/projects/{id}/force", post(force_sync))
         .route("/sync/scheduled", post(run_scheduled_sync))
         .route("/status", get(get_sync_status))
         .route("/unsynced", get(get_unsynced_projects))
         .route("/history", get(get_sync_history))
         .route("/projects", post(create_project_from_poc))
         .route("/projects/{id}", put(update_project_from_poc))
         .route("/settings", get(get_sync_settings).put(update_sync_settings))
         .with_state(state)
   }

   async fn send(
      app: Router,
      method: Method,
      uri: &str,
      body: Option<&str>,
   ) -> (StatusCode, Vec<u8>) {
      let mut builder = Request::builder().method(method).uri(uri);
      if body.is_some() {
         builder = builder.header("content-type", "application/json");
      }
      let request = builder
         .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
         .unwrap();
      let response = app.oneshot(request).await.unwrap();
      let status = response.status();
      let body = axum::body::to_bytes(response.into_body(), usize::MAX)
         .await
         .unwrap();
      (status, body.to_vec())
   }

   const VALID_SETTINGS: &str = r#"{"auto_sync_enabled":true,"sync_interval_hours":12,"max_retry_attempts":5,"notify_on_error":false}"#;

   #[tokio::test]
   async fn test_全同期は同期結果を返す() {
      // Given
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      // When
      let (status, body) = send(app, Method::POST, "/sync/all", None).await;

      // Then
      assert_eq!(status, StatusCode::OK);
      let result: SyncResultDto = serde_json::from_slice(&body).unwrap();
      assert_eq!(result, sync_result());
      assert_eq!(client.calls(), 1);
   }

   #[tokio::test]
   async fn test_個別同期はidを渡してメッセージを返す() {
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      let (status, body) = send(app, Method::POST, "/sync/projects/poc-42", None).await;

      assert_eq!(status, StatusCode::OK);
      let message: MessageResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(message, MessageResponse::new("同期が完了しました"));
      assert_eq!(
         client.last_synced_id.lock().unwrap().as_deref(),
         Some("poc-42")
      );
   }

   #[rstest]
   #[case("/sync/projects/%20")]
   #[case("/sync/projects/%20/force")]
   #[tokio::test]
   async fn test_空白のidは400でサービスを呼ばない(#[case] uri: &str) {
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      let (status, body) = send(app, Method::POST, uri, None).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error, ErrorResponse::new("POCプロジェクトIDが必要です"));
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_強制同期の通信エラーは固定メッセージの500() {
      let client = Arc::new(StubPocSyncClient {
         fail_force: true,
         ..Default::default()
      });
      let app = create_test_app(client);

      let (status, body) = send(app, Method::POST, "/sync/projects/poc-1/force", None).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error, ErrorResponse::new("強制同期に失敗しました"));
   }

   #[tokio::test]
   async fn test_未同期一覧はitemsとtotalで返す() {
      let app = create_test_app(Arc::new(StubPocSyncClient::default()));

      let (status, body) = send(app, Method::GET, "/unsynced", None).await;

      assert_eq!(status, StatusCode::OK);
      let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
      assert_eq!(json["total"], 2);
      assert_eq!(json["items"][1]["id"], "poc-2");
   }

   #[tokio::test]
   async fn test_同期履歴は適用後のページ情報を返す() {
      // Given
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      // When
      let (status, body) = send(
         app,
         Method::GET,
         "/history?start_date=2024-04-01T00:00:00Z&status=failed&page=2&limit=500",
         None,
      )
      .await;

      // Then
      assert_eq!(status, StatusCode::OK);
      let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
      assert_eq!(json["total"], 41);
      assert_eq!(json["page"], 2);
      assert_eq!(json["limit"], 100);

      let filter = client.last_filter.lock().unwrap().clone().unwrap();
      assert_eq!(filter.limit, 100);
      assert_eq!(filter.status.as_deref(), Some("failed"));
      assert_eq!(
         filter.start_date,
         Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap())
      );
      assert_eq!(filter.end_date, None);
   }

   #[rstest]
   #[case("/history?start_date=2024-04-01", "開始日時の形式が不正です")]
   #[case("/history?end_date=tomorrow", "終了日時の形式が不正です")]
   #[tokio::test]
   async fn test_同期履歴のrfc3339以外の日時は400(#[case] uri: &str, #[case] expected: &str) {
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      let (status, body) = send(app, Method::GET, uri, None).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error.error, expected);
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_poc案件作成は201で案件を返す() {
      let app = create_test_app(Arc::new(StubPocSyncClient::default()));

      let (status, body) = send(
         app,
         Method::POST,
         "/projects",
         Some(r#"{"poc_project_id":"poc-1"}"#),
      )
      .await;

      assert_eq!(status, StatusCode::CREATED);
      let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
      assert_eq!(json["poc_project_id"], "poc-1");
   }

   #[rstest]
   #[case("{}")]
   #[case(r#"{"poc_project_id":""}"#)]
   #[case("not json")]
   #[tokio::test]
   async fn test_poc案件作成の入力不正は400(#[case] body: &str) {
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      let (status, _) = send(app, Method::POST, "/projects", Some(body)).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_poc案件更新はパスの案件idを使う() {
      let app = create_test_app(Arc::new(StubPocSyncClient::default()));

      let (status, body) = send(
         app,
         Method::PUT,
         "/projects/prj-9",
         Some(r#"{"poc_project_id":"poc-1"}"#),
      )
      .await;

      assert_eq!(status, StatusCode::OK);
      let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
      assert_eq!(json["id"], "prj-9");
   }

   #[tokio::test]
   async fn test_同期設定の更新() {
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      let (status, body) = send(app, Method::PUT, "/settings", Some(VALID_SETTINGS)).await;

      assert_eq!(status, StatusCode::OK);
      let message: MessageResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(message.message, "同期設定を更新しました");
      let saved = client.last_settings.lock().unwrap().clone().unwrap();
      assert_eq!(saved.sync_interval_hours, 12);
      assert_eq!(saved.max_retry_attempts, 5);
   }

   #[rstest]
   #[case(
      r#"{"auto_sync_enabled":true,"sync_interval_hours":0,"max_retry_attempts":3,"notify_on_error":false}"#,
      "同期間隔は1時間以上で指定してください"
   )]
   #[case(
      r#"{"auto_sync_enabled":true,"sync_interval_hours":1,"max_retry_attempts":11,"notify_on_error":false}"#,
      "最大リトライ回数は10回以下で指定してください"
   )]
   #[case(r#"{"auto_sync_enabled":true}"#, "リクエストが不正です")]
   #[tokio::test]
   async fn test_同期設定の範囲外は400(#[case] body: &str, #[case] expected: &str) {
      let client = Arc::new(StubPocSyncClient::default());
      let app = create_test_app(client.clone());

      let (status, body) = send(app, Method::PUT, "/settings", Some(body)).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error.error, expected);
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_同じgetを繰り返すと同じバイト列を返す() {
      let client = Arc::new(StubPocSyncClient::default());

      let (_, first) = send(create_test_app(client.clone()), Method::GET, "/settings", None).await;
      let (_, second) = send(create_test_app(client.clone()), Method::GET, "/settings", None).await;

      assert_eq!(first, second);
      assert_eq!(client.calls(), 2);
   }
}
