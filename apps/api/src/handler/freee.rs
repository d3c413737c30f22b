//! # freee 連携ハンドラ
//!
//! 経理担当（`accounting` ロール）向けの freee 連携エンドポイント。
//! すべて `/api/v1/admin/accounting/freee` 配下。
//!
//! ## エンドポイント
//!
//! - `GET /status` - 連携状態
//! - `POST /oauth/initiate` - OAuth 認可フロー開始
//! - `POST /oauth/complete` - OAuth 認可コード交換
//! - `POST /test` - 接続テスト
//! - `GET /companies` - 事業所一覧
//! - `POST /companies/select` - 事業所選択
//! - `DELETE /disconnect` - 連携解除
//! - `POST /sync/partners`, `POST /sync/invoices`, `GET /sync/history`, `GET /sync/summary`
//!   - 入力検証のみ行い 501 を返す

use std::sync::{Arc, LazyLock};

use axum::{
   Extension,
   Json,
   extract::{State, rejection::JsonRejection},
   response::{IntoResponse, Response},
};
use kanri_shared::ListResponse;
use regex::Regex;
use serde::Deserialize;

use crate::{
   client::{
      CoreServiceFreeeClient,
      core_service::{
         FreeeOAuthCompleteCoreRequest,
         FreeeOAuthInitiateCoreRequest,
         FreeeSelectCompanyCoreRequest,
      },
   },
   error::{
      INVALID_REQUEST_MESSAGE,
      bad_request_response,
      message_response,
      not_implemented_response,
      service_error_response,
      unauthorized_response,
   },
   middleware::CurrentUser,
};

/// `YYYY-MM`
static TARGET_MONTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("対象月の正規表現が不正です")
});

/// freee 連携 API の共有状態
pub struct FreeeState {
   pub core_service_client: Arc<dyn CoreServiceFreeeClient>,
}

// --- リクエスト型 ---

#[derive(Debug, Deserialize)]
pub struct InitiateOAuthRequest {
   #[serde(default)]
   pub redirect_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteOAuthRequest {
   pub code:  Option<String>,
   pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectCompanyRequest {
   pub company_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SyncPartnersRequest {
   #[serde(default)]
   pub client_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SyncInvoicesRequest {
   pub invoice_ids:  Option<Vec<String>>,
   pub target_month: Option<String>,
}

// --- ハンドラ ---

/// GET /api/v1/admin/accounting/freee/status
pub async fn get_connection_status(
   State(state): State<Arc<FreeeState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state
      .core_service_client
      .get_freee_connection_status(user.user_id)
      .await
   {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("freee連携状態取得(user_id={})", user.user_id),
         "freee連携状態の取得に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/admin/accounting/freee/oauth/initiate
///
/// `redirect_url` は絶対 URL であること。
pub async fn initiate_oauth(
   State(state): State<Arc<FreeeState>>,
   current_user: Option<Extension<CurrentUser>>,
   payload: Result<Json<InitiateOAuthRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   let redirect_url = req.redirect_url.trim();
   if redirect_url.is_empty() {
      return bad_request_response("リダイレクトURLが必要です");
   }
   if url::Url::parse(redirect_url).is_err() {
      return bad_request_response("リダイレクトURLの形式が不正です");
   }

   let core_req = FreeeOAuthInitiateCoreRequest {
      user_id:      user.user_id,
      redirect_url: redirect_url.to_string(),
   };
   match state.core_service_client.initiate_freee_oauth(&core_req).await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("freee OAuth開始(user_id={})", user.user_id),
         "freee認証の開始に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/admin/accounting/freee/oauth/complete
pub async fn complete_oauth(
   State(state): State<Arc<FreeeState>>,
   current_user: Option<Extension<CurrentUser>>,
   payload: Result<Json<CompleteOAuthRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   let (Some(code), Some(oauth_state)) = (
      req.code.filter(|c| !c.trim().is_empty()),
      req.state.filter(|s| !s.trim().is_empty()),
   ) else {
      return bad_request_response("認可コードとstateが必要です");
   };

   let core_req = FreeeOAuthCompleteCoreRequest {
      user_id: user.user_id,
      code,
      state: oauth_state,
   };
   match state.core_service_client.complete_freee_oauth(&core_req).await {
      Ok(()) => message_response("freee認証が完了しました"),
      Err(e) => service_error_response(
         &format!("freee OAuth完了(user_id={})", user.user_id),
         "freee認証の完了に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/admin/accounting/freee/test
pub async fn test_connection(
   State(state): State<Arc<FreeeState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state
      .core_service_client
      .test_freee_connection(user.user_id)
      .await
   {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("freee接続テスト(user_id={})", user.user_id),
         "freee接続テストに失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/admin/accounting/freee/companies
pub async fn get_companies(
   State(state): State<Arc<FreeeState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state
      .core_service_client
      .get_freee_companies(user.user_id)
      .await
   {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         &format!("freee事業所一覧取得(user_id={})", user.user_id),
         "事業所一覧の取得に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/admin/accounting/freee/companies/select
pub async fn select_company(
   State(state): State<Arc<FreeeState>>,
   current_user: Option<Extension<CurrentUser>>,
   payload: Result<Json<SelectCompanyRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if req.company_id <= 0 {
      return bad_request_response("事業所IDが不正です");
   }

   let core_req = FreeeSelectCompanyCoreRequest {
      user_id:    user.user_id,
      company_id: req.company_id,
   };
   match state.core_service_client.select_freee_company(&core_req).await {
      Ok(()) => message_response("事業所を選択しました"),
      Err(e) => service_error_response(
         &format!(
            "freee事業所選択(user_id={}, company_id={})",
            user.user_id, req.company_id
         ),
         "事業所の選択に失敗しました",
         e,
      ),
   }
}

/// DELETE /api/v1/admin/accounting/freee/disconnect
pub async fn disconnect(
   State(state): State<Arc<FreeeState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state.core_service_client.disconnect_freee(user.user_id).await {
      Ok(()) => message_response("freee連携を解除しました"),
      Err(e) => service_error_response(
         &format!("freee連携解除(user_id={})", user.user_id),
         "freee連携の解除に失敗しました",
         e,
      ),
   }
}

// --- 準備中のエンドポイント ---

/// POST /api/v1/admin/accounting/freee/sync/partners
pub async fn sync_partners(payload: Result<Json<SyncPartnersRequest>, JsonRejection>) -> Response {
   if payload.is_err() {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   }
   not_implemented_response("freee取引先同期は現在準備中です")
}

/// POST /api/v1/admin/accounting/freee/sync/invoices
///
/// `invoice_ids` と `target_month` のどちらかが必要。`target_month` は `YYYY-MM`。
pub async fn sync_invoices(payload: Result<Json<SyncInvoicesRequest>, JsonRejection>) -> Response {
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };

   let has_invoice_ids = req.invoice_ids.as_ref().is_some_and(|ids| !ids.is_empty());
   match req.target_month.as_deref().map(str::trim) {
      Some(month) if !month.is_empty() => {
         if !TARGET_MONTH_PATTERN.is_match(month) {
            return bad_request_response("対象月はYYYY-MM形式で指定してください");
         }
      }
      _ if !has_invoice_ids => {
         return bad_request_response("請求書IDまたは対象月を指定してください");
      }
      _ => {}
   }

   not_implemented_response("freee請求書同期は現在準備中です")
}

/// GET /api/v1/admin/accounting/freee/sync/history
pub async fn get_sync_history() -> impl IntoResponse {
   not_implemented_response("freee同期履歴は現在準備中です")
}

/// GET /api/v1/admin/accounting/freee/sync/summary
pub async fn get_sync_summary() -> impl IntoResponse {
   not_implemented_response("freee同期サマリーは現在準備中です")
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
      http::{Method, Request, StatusCode},
      routing::{delete, get, post},
   };
   use kanri_shared::{ApiResponse, ErrorResponse, MessageResponse};
   use pretty_assertions::assert_eq;
   use rstest::rstest;
   use tower::ServiceExt;
   use uuid::Uuid;

   use super::*;
   use crate::client::{
      CoreServiceError,
      core_service::{
         FreeeCompanyDto,
         FreeeConnectionStatusDto,
         FreeeConnectionTestDto,
         FreeeOAuthInitiateDto,
      },
   };

   #[derive(Default)]
   struct StubFreeeClient {
      calls:            AtomicUsize,
      selected_company: Mutex<Option<i64>>,
   }

   impl StubFreeeClient {
      fn calls(&self) -> usize {
         self.calls.load(Ordering::SeqCst)
      }

      fn record(&self) {
         self.calls.fetch_add(1, Ordering::SeqCst);
      }
   }

   #[async_trait]
   impl CoreServiceFreeeClient for StubFreeeClient {
      async fn get_freee_connection_status(
         &self,
         _user_id: Uuid,
      ) -> Result<ApiResponse<FreeeConnectionStatusDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(FreeeConnectionStatusDto {
            is_connected:     true,
            company_id:       Some(1234),
            company_name:     Some("株式会社テスト".to_string()),
            token_expires_at: None,
            last_sync_at:     None,
         }))
      }

      async fn initiate_freee_oauth(
         &self,
         req: &FreeeOAuthInitiateCoreRequest,
      ) -> Result<ApiResponse<FreeeOAuthInitiateDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(FreeeOAuthInitiateDto {
            auth_url: format!(
               "https://accounts.secure.freee.co.jp/public_api/authorize?redirect_uri={}",
               req.redirect_url
            ),
            state:    "state-123".to_string(),
         }))
      }

      async fn complete_freee_oauth(
         &self,
         _req: &FreeeOAuthCompleteCoreRequest,
      ) -> Result<(), CoreServiceError> {
         self.record();
         Ok(())
      }

      async fn test_freee_connection(
         &self,
         _user_id: Uuid,
      ) -> Result<ApiResponse<FreeeConnectionTestDto>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(FreeeConnectionTestDto {
            success: true,
            message: "接続に成功しました".to_string(),
         }))
      }

      async fn get_freee_companies(
         &self,
         _user_id: Uuid,
      ) -> Result<ApiResponse<Vec<FreeeCompanyDto>>, CoreServiceError> {
         self.record();
         Ok(ApiResponse::new(vec![FreeeCompanyDto {
            id:           1234,
            name:         "株式会社テスト".to_string(),
            display_name: None,
            role:         Some("admin".to_string()),
         }]))
      }

      async fn select_freee_company(
         &self,
         req: &FreeeSelectCompanyCoreRequest,
      ) -> Result<(), CoreServiceError> {
         self.record();
         *self.selected_company.lock().unwrap() = Some(req.company_id);
         Ok(())
      }

      async fn disconnect_freee(&self, _user_id: Uuid) -> Result<(), CoreServiceError> {
         self.record();
         Err(CoreServiceError::Unexpected("token revoke failed".to_string()))
      }
   }

   fn create_test_app(client: Arc<StubFreeeClient>, authenticated: bool) -> Router {
      let state = Arc::new(FreeeState {
         core_service_client: client,
      });
      let router = Router::new()
         .route("/status", get(get_connection_status))
         .route("/oauth/initiate", post(initiate_oauth))
         .route("/oauth/complete", post(complete_oauth))
         .route("/test", post(test_connection))
         .route("/companies", get(get_companies))
         .route("/companies/select", post(select_company))
         .route("/disconnect", delete(disconnect))
         .route("/sync/partners", post(sync_partners))
         .route("/sync/invoices", post(sync_invoices))
         .route("/sync/history", get(get_sync_history))
         .route("/sync/summary", get(get_sync_summary))
         .with_state(state);
      if authenticated {
         router.layer(Extension(CurrentUser {
            user_id: Uuid::now_v7(),
            email:   "accounting@example.com".to_string(),
            name:    "経理 一郎".to_string(),
            roles:   vec!["accounting".to_string()],
         }))
      } else {
         router
      }
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

   #[tokio::test]
   async fn test_oauth開始はauth_urlとstateを返す() {
      // Given
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client.clone(), true);

      // When
      let (status, body) = send(
         app,
         Method::POST,
         "/oauth/initiate",
         Some(r#"{"redirect_url":"https://kanri.example.com/freee/callback"}"#),
      )
      .await;

      // Then
      assert_eq!(status, StatusCode::OK);
      let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
      assert_eq!(json["state"], "state-123");
      assert!(json["auth_url"].as_str().unwrap().starts_with("https://"));
      assert_eq!(client.calls(), 1);
   }

   #[rstest]
   #[case("{}")]
   #[case(r#"{"redirect_url":"  "}"#)]
   #[case(r#"{"redirect_url":"not a url"}"#)]
   #[case("{broken")]
   #[tokio::test]
   async fn test_oauth開始の入力不正は400(#[case] body: &str) {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client.clone(), true);

      let (status, _) = send(app, Method::POST, "/oauth/initiate", Some(body)).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_oauth完了はメッセージを返す() {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client, true);

      let (status, body) = send(
         app,
         Method::POST,
         "/oauth/complete",
         Some(r#"{"code":"auth-code","state":"state-123"}"#),
      )
      .await;

      assert_eq!(status, StatusCode::OK);
      let message: MessageResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(message, MessageResponse::new("freee認証が完了しました"));
   }

   #[rstest]
   #[case(r#"{"state":"state-123"}"#)]
   #[case(r#"{"code":"auth-code"}"#)]
   #[case(r#"{"code":"","state":"state-123"}"#)]
   #[tokio::test]
   async fn test_oauth完了はcodeとstateが必須(#[case] body: &str) {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client.clone(), true);

      let (status, _) = send(app, Method::POST, "/oauth/complete", Some(body)).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_事業所一覧はitemsとtotalで返す() {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client, true);

      let (status, body) = send(app, Method::GET, "/companies", None).await;

      assert_eq!(status, StatusCode::OK);
      let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
      assert_eq!(json["total"], 1);
      assert_eq!(json["items"][0]["id"], 1234);
   }

   #[rstest]
   #[case(0)]
   #[case(-1)]
   #[tokio::test]
   async fn test_事業所選択は正のidのみ受け付ける(#[case] company_id: i64) {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client.clone(), true);

      let (status, _) = send(
         app,
         Method::POST,
         "/companies/select",
         Some(&format!(r#"{{"company_id":{company_id}}}"#)),
      )
      .await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_事業所選択の成功() {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client.clone(), true);

      let (status, body) = send(
         app,
         Method::POST,
         "/companies/select",
         Some(r#"{"company_id":1234}"#),
      )
      .await;

      assert_eq!(status, StatusCode::OK);
      let message: MessageResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(message.message, "事業所を選択しました");
      assert_eq!(*client.selected_company.lock().unwrap(), Some(1234));
   }

   #[tokio::test]
   async fn test_連携解除の失敗は内部文言を返さない() {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client, true);

      let (status, body) = send(app, Method::DELETE, "/disconnect", None).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error, ErrorResponse::new("freee連携の解除に失敗しました"));
   }

   #[rstest]
   #[case(Method::POST, "/sync/partners", Some(r#"{"client_ids":["c-1"]}"#))]
   #[case(Method::POST, "/sync/invoices", Some(r#"{"target_month":"2024-04"}"#))]
   #[case(Method::POST, "/sync/invoices", Some(r#"{"invoice_ids":["inv-1"]}"#))]
   #[case(Method::GET, "/sync/history", None)]
   #[case(Method::GET, "/sync/summary", None)]
   #[tokio::test]
   async fn test_準備中の同期エンドポイントは501(
      #[case] method: Method,
      #[case] uri: &str,
      #[case] body: Option<&str>,
   ) {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client.clone(), true);

      let (status, body) = send(app, method, uri, body).await;

      assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error.code.as_deref(), Some("NOT_IMPLEMENTED"));
      assert_eq!(client.calls(), 0);
   }

   #[rstest]
   #[case("{}")]
   #[case(r#"{"invoice_ids":[]}"#)]
   #[case(r#"{"target_month":"2024-13"}"#)]
   #[case(r#"{"target_month":"2024/04"}"#)]
   #[case(r#"{"invoice_ids":["inv-1"],"target_month":"24-04"}"#)]
   #[tokio::test]
   async fn test_請求書同期の入力不正は400(#[case] body: &str) {
      let app = create_test_app(Arc::new(StubFreeeClient::default()), true);

      let (status, _) = send(app, Method::POST, "/sync/invoices", Some(body)).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
   }

   #[tokio::test]
   async fn test_取引先同期の不正なjsonは400() {
      let app = create_test_app(Arc::new(StubFreeeClient::default()), true);

      let (status, _) = send(app, Method::POST, "/sync/partners", Some("[1,2")).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
   }

   #[tokio::test]
   async fn test_未認証は401でサービスを呼ばない() {
      let client = Arc::new(StubFreeeClient::default());
      let app = create_test_app(client.clone(), false);

      let (status, body) = send(app, Method::GET, "/status", None).await;

      assert_eq!(status, StatusCode::UNAUTHORIZED);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error.error, "認証が必要です");
      assert_eq!(client.calls(), 0);
   }
}
