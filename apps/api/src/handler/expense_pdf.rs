//! # 経費 PDF ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/expenses/{id}/pdf` - 経費申請 1 件の PDF
//! - `GET /api/v1/expenses/pdf` - 経費一覧の PDF
//!
//! PDF は Core Service が生成したバイト列を受け取りきってから返す。
//! エラー時に PDF の一部が書き出されることはない。

use std::sync::Arc;

use axum::{
   Extension,
   extract::{Path, Query, State},
   http::{StatusCode, header},
   response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
   client::{CoreServiceError, CoreServiceExpensePdfClient, core_service::ExpenseListPdfFilter},
   error::{error_with_code_response, unauthorized_response},
   middleware::CurrentUser,
   params::{non_blank, parse_limit, parse_rfc3339},
};

/// 一覧 PDF の `limit` デフォルト
pub const DEFAULT_PDF_LIST_LIMIT: u32 = 100;

/// 一覧 PDF の `limit` 上限
pub const MAX_PDF_LIST_LIMIT: u32 = 500;

const PDF_GENERATION_FAILED: &str = "PDFの生成に失敗しました";

/// 経費 PDF API の共有状態
pub struct ExpensePdfState {
   pub core_service_client: Arc<dyn CoreServiceExpensePdfClient>,
}

// --- リクエスト型 ---

/// 一覧 PDF のクエリ
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListPdfQuery {
   pub status:     Option<String>,
   pub start_date: Option<String>,
   pub end_date:   Option<String>,
   pub limit:      Option<String>,
}

// --- ハンドラ ---

/// GET /api/v1/expenses/{id}/pdf
pub async fn generate_expense_pdf(
   State(state): State<Arc<ExpensePdfState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let Ok(expense_id) = Uuid::parse_str(id.trim()) else {
      return error_with_code_response(
         StatusCode::BAD_REQUEST,
         "無効な経費IDです",
         "INVALID_EXPENSE_ID",
      );
   };

   match state
      .core_service_client
      .generate_expense_pdf(user.user_id, expense_id)
      .await
   {
      Ok(pdf) => pdf_response(&format!("{expense_id}.pdf"), pdf),
      Err(CoreServiceError::NotFound(_)) => error_with_code_response(
         StatusCode::NOT_FOUND,
         "経費申請が見つかりません",
         "EXPENSE_NOT_FOUND",
      ),
      Err(CoreServiceError::Forbidden(_)) => error_with_code_response(
         StatusCode::FORBIDDEN,
         "この経費申請へのアクセス権限がありません",
         "EXPENSE_ACCESS_DENIED",
      ),
      Err(e) => {
         tracing::error!(
            error.category = "external_service",
            expense_id = %expense_id,
            user_id = %user.user_id,
            "経費PDF生成で内部エラー: {}",
            e
         );
         pdf_generation_failed_response()
      }
   }
}

/// GET /api/v1/expenses/pdf
///
/// `limit` はデフォルト 100、上限 500 に丸めてから Core Service に渡す。
pub async fn generate_expense_list_pdf(
   State(state): State<Arc<ExpensePdfState>>,
   current_user: Option<Extension<CurrentUser>>,
   Query(query): Query<ExpenseListPdfQuery>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let Ok(start_date) = parse_rfc3339(query.start_date.as_deref()) else {
      return invalid_date_response("開始日の形式が不正です");
   };
   let Ok(end_date) = parse_rfc3339(query.end_date.as_deref()) else {
      return invalid_date_response("終了日の形式が不正です");
   };

   let filter = ExpenseListPdfFilter {
      status: non_blank(query.status.as_deref()).map(str::to_string),
      start_date,
      end_date,
      limit: parse_limit(
         query.limit.as_deref(),
         DEFAULT_PDF_LIST_LIMIT,
         MAX_PDF_LIST_LIMIT,
      ),
   };

   match state
      .core_service_client
      .generate_expense_list_pdf(user.user_id, &filter)
      .await
   {
      Ok(pdf) => pdf_response("expenses.pdf", pdf),
      Err(e) => {
         tracing::error!(
            error.category = "external_service",
            user_id = %user.user_id,
            limit = filter.limit,
            "経費一覧PDF生成で内部エラー: {}",
            e
         );
         pdf_generation_failed_response()
      }
   }
}

// --- レスポンス ---

fn pdf_response(filename: &str, pdf: Bytes) -> Response {
   (
      StatusCode::OK,
      [
         (header::CONTENT_TYPE, "application/pdf".to_string()),
         (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
         ),
      ],
      pdf,
   )
      .into_response()
}

fn pdf_generation_failed_response() -> Response {
   error_with_code_response(
      StatusCode::INTERNAL_SERVER_ERROR,
      PDF_GENERATION_FAILED,
      "PDF_GENERATION_FAILED",
   )
}

fn invalid_date_response(message: &str) -> Response {
   error_with_code_response(StatusCode::BAD_REQUEST, message, "INVALID_DATE_FORMAT")
}

#[cfg(test)]
mod tests {
   use std::sync::{
      Mutex,
      atomic::{AtomicUsize, Ordering},
   };

   use async_trait::async_trait;
   use axum::{Router, body::Body, http::Request, routing::get};
   use kanri_shared::ErrorResponse;
   use pretty_assertions::assert_eq;
   use rstest::rstest;
   use tower::ServiceExt;

   use super::*;

   const PDF_BYTES: &[u8] = b"%PDF-1.7\n%kanri\n";

   struct StubExpensePdfClient {
      result:      Result<Bytes, CoreServiceError>,
      calls:       AtomicUsize,
      last_filter: Mutex<Option<ExpenseListPdfFilter>>,
   }

   impl StubExpensePdfClient {
      fn returning(result: Result<Bytes, CoreServiceError>) -> Arc<Self> {
         Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
            last_filter: Mutex::new(None),
         })
      }

      fn calls(&self) -> usize {
         self.calls.load(Ordering::SeqCst)
      }
   }

   #[async_trait]
   impl CoreServiceExpensePdfClient for StubExpensePdfClient {
      async fn generate_expense_pdf(
         &self,
         _user_id: Uuid,
         _expense_id: Uuid,
      ) -> Result<Bytes, CoreServiceError> {
         self.calls.fetch_add(1, Ordering::SeqCst);
         self.result.clone()
      }

      async fn generate_expense_list_pdf(
         &self,
         _user_id: Uuid,
         filter: &ExpenseListPdfFilter,
      ) -> Result<Bytes, CoreServiceError> {
         self.calls.fetch_add(1, Ordering::SeqCst);
         *self.last_filter.lock().unwrap() = Some(filter.clone());
         self.result.clone()
      }
   }

   fn test_user() -> CurrentUser {
      CurrentUser {
         user_id: Uuid::now_v7(),
         email:   "engineer@example.com".to_string(),
         name:    "山田 花子".to_string(),
         roles:   vec!["engineer".to_string()],
      }
   }

   fn create_test_app(client: Arc<StubExpensePdfClient>, user: Option<CurrentUser>) -> Router {
      let state = Arc::new(ExpensePdfState {
         core_service_client: client,
      });
      let router = Router::new()
         .route("/api/v1/expenses/pdf", get(generate_expense_list_pdf))
         .route("/api/v1/expenses/{id}/pdf", get(generate_expense_pdf))
         .with_state(state);
      match user {
         Some(user) => router.layer(Extension(user)),
         None => router,
      }
   }

   async fn send(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Bytes) {
      let response = app
         .oneshot(Request::get(uri).body(Body::empty()).unwrap())
         .await
         .unwrap();
      let status = response.status();
      let headers = response.headers().clone();
      let body = axum::body::to_bytes(response.into_body(), usize::MAX)
         .await
         .unwrap();
      (status, headers, body)
   }

   #[tokio::test]
   async fn test_単票pdfはpdfヘッダーとバイト列を返す() {
      // Given
      let client = StubExpensePdfClient::returning(Ok(Bytes::from_static(PDF_BYTES)));
      let app = create_test_app(client.clone(), Some(test_user()));
      let expense_id = Uuid::now_v7();

      // When
      let (status, headers, body) = send(app, &format!("/api/v1/expenses/{expense_id}/pdf")).await;

      // Then
      assert_eq!(status, StatusCode::OK);
      assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
      assert_eq!(
         headers[header::CONTENT_DISPOSITION],
         format!("attachment; filename={expense_id}.pdf").as_str()
      );
      assert_eq!(body.as_ref(), PDF_BYTES);
      assert_eq!(client.calls(), 1);
   }

   #[tokio::test]
   async fn test_無効な経費idは400でサービスを呼ばない() {
      let client = StubExpensePdfClient::returning(Ok(Bytes::from_static(PDF_BYTES)));
      let app = create_test_app(client.clone(), Some(test_user()));

      let (status, _, body) = send(app, "/api/v1/expenses/not-a-uuid/pdf").await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(
         error,
         ErrorResponse::with_code("無効な経費IDです", "INVALID_EXPENSE_ID")
      );
      assert_eq!(client.calls(), 0);
   }

   #[rstest]
   #[case(CoreServiceError::NotFound("not found".to_string()), StatusCode::NOT_FOUND, "EXPENSE_NOT_FOUND")]
   #[case(CoreServiceError::Forbidden("forbidden".to_string()), StatusCode::FORBIDDEN, "EXPENSE_ACCESS_DENIED")]
   #[case(CoreServiceError::Network("timeout".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "PDF_GENERATION_FAILED")]
   #[case(CoreServiceError::Unexpected("renderer crashed".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "PDF_GENERATION_FAILED")]
   #[tokio::test]
   async fn test_単票pdfの失敗はエラーコード付きjsonを返す(
      #[case] err: CoreServiceError,
      #[case] expected_status: StatusCode,
      #[case] expected_code: &str,
   ) {
      let client = StubExpensePdfClient::returning(Err(err));
      let app = create_test_app(client, Some(test_user()));

      let (status, headers, body) =
         send(app, &format!("/api/v1/expenses/{}/pdf", Uuid::now_v7())).await;

      assert_eq!(status, expected_status);
      assert_eq!(headers[header::CONTENT_TYPE], "application/json");
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error.code.as_deref(), Some(expected_code));
   }

   #[rstest]
   #[case("", 100)]
   #[case("?limit=50", 50)]
   #[case("?limit=500", 500)]
   #[case("?limit=10000", 500)]
   #[case("?limit=0", 100)]
   #[case("?limit=many", 100)]
   #[tokio::test]
   async fn test_一覧pdfのlimitは上限500に丸めてから渡す(
      #[case] query: &str,
      #[case] expected_limit: u32,
   ) {
      // Given
      let client = StubExpensePdfClient::returning(Ok(Bytes::from_static(PDF_BYTES)));
      let app = create_test_app(client.clone(), Some(test_user()));

      // When
      let (status, headers, _) = send(app, &format!("/api/v1/expenses/pdf{query}")).await;

      // Then
      assert_eq!(status, StatusCode::OK);
      assert_eq!(
         headers[header::CONTENT_DISPOSITION],
         "attachment; filename=expenses.pdf"
      );
      let filter = client.last_filter.lock().unwrap().clone().unwrap();
      assert_eq!(filter.limit, expected_limit);
   }

   #[tokio::test]
   async fn test_一覧pdfの日付はrfc3339でなければ400でサービスを呼ばない() {
      let client = StubExpensePdfClient::returning(Ok(Bytes::from_static(PDF_BYTES)));
      let app = create_test_app(client.clone(), Some(test_user()));

      let (status, _, body) = send(app, "/api/v1/expenses/pdf?start_date=2024-04-01").await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(error.code.as_deref(), Some("INVALID_DATE_FORMAT"));
      assert_eq!(client.calls(), 0);
   }

   #[tokio::test]
   async fn test_一覧pdfの失敗は500() {
      let client = StubExpensePdfClient::returning(Err(CoreServiceError::Network(
         "connection reset".to_string(),
      )));
      let app = create_test_app(client, Some(test_user()));

      let (status, _, body) = send(app, "/api/v1/expenses/pdf?status=approved").await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      assert_eq!(
         error,
         ErrorResponse::with_code(PDF_GENERATION_FAILED, "PDF_GENERATION_FAILED")
      );
   }

   #[tokio::test]
   async fn test_未認証は401でサービスを呼ばない() {
      let client = StubExpensePdfClient::returning(Ok(Bytes::from_static(PDF_BYTES)));
      let app = create_test_app(client.clone(), None);

      let (status, _, _) = send(app, &format!("/api/v1/expenses/{}/pdf", Uuid::now_v7())).await;

      assert_eq!(status, StatusCode::UNAUTHORIZED);
      assert_eq!(client.calls(), 0);
   }
}
