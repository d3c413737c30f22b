//! # API エラーハンドリング
//!
//! ハンドラが共通で使うエラーレスポンスのヘルパー関数を集約する。
//!
//! エラーボディは常に `{"error": "...", "code"?: "..."}` 形式。
//! 5xx では内部のエラー文言をクライアントに返さず、呼び出し側が指定した
//! 固定メッセージを返す。

use axum::{
   Json,
   http::StatusCode,
   response::{IntoResponse, Response},
};
use itertools::Itertools;
use kanri_shared::{ErrorResponse, MessageResponse};
use validator::ValidationErrors;

use crate::client::CoreServiceError;

/// 認証が必要な操作でセッションがないときのメッセージ
pub const UNAUTHORIZED_MESSAGE: &str = "認証が必要です";

/// JSON ボディのパースに失敗したときのメッセージ
pub const INVALID_REQUEST_MESSAGE: &str = "リクエストが不正です";

// --- レスポンスヘルパー ---

/// 任意ステータスのエラーレスポンス
pub fn error_response(status: StatusCode, message: &str) -> Response {
   (status, Json(ErrorResponse::new(message))).into_response()
}

/// エラーコード付きのエラーレスポンス
pub fn error_with_code_response(status: StatusCode, message: &str, code: &str) -> Response {
   (status, Json(ErrorResponse::with_code(message, code))).into_response()
}

/// 400 Bad Request レスポンス
pub fn bad_request_response(message: &str) -> Response {
   error_response(StatusCode::BAD_REQUEST, message)
}

/// 401 Unauthorized レスポンス
pub fn unauthorized_response() -> Response {
   error_response(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
}

/// 403 Forbidden レスポンス
pub fn forbidden_response(message: &str) -> Response {
   error_response(StatusCode::FORBIDDEN, message)
}

/// 404 Not Found レスポンス
pub fn not_found_response(message: &str) -> Response {
   error_response(StatusCode::NOT_FOUND, message)
}

/// 409 Conflict レスポンス
pub fn conflict_response(message: &str) -> Response {
   error_response(StatusCode::CONFLICT, message)
}

/// 500 Internal Server Error レスポンス
pub fn internal_error_response(message: &str) -> Response {
   error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// 501 Not Implemented レスポンス
///
/// 準備中の機能に使う。空データの正常応答（200）とは区別する。
pub fn not_implemented_response(message: &str) -> Response {
   (
      StatusCode::NOT_IMPLEMENTED,
      Json(ErrorResponse::not_implemented(message)),
   )
      .into_response()
}

/// ペイロードを持たないコマンドの成功レスポンス
pub fn message_response(message: &str) -> Response {
   (StatusCode::OK, Json(MessageResponse::new(message))).into_response()
}

/// `validator` の検証エラーを 400 に変換する
///
/// 複数フィールドが不正な場合でも同じ入力には同じメッセージを返すよう、
/// フィールド名順で最初のメッセージを採用する。
pub fn validation_errors_response(errors: &ValidationErrors) -> Response {
   let message = errors
      .field_errors()
      .into_iter()
      .sorted_by(|(a, _), (b, _)| a.cmp(b))
      .flat_map(|(_, errors)| errors.iter())
      .find_map(|error| error.message.as_ref().map(|m| m.to_string()))
      .unwrap_or_else(|| INVALID_REQUEST_MESSAGE.to_string());

   bad_request_response(&message)
}

// --- Core Service エラーの変換 ---

/// Core Service エラーをログ付きでレスポンスに変換する
///
/// - `NotFound` / `ValidationError` / `Unauthorized` / `Forbidden` / `Conflict` は
///   対応するステータスとエラーメッセージを返す
/// - `App` はステータスとエラーコードを保ったまま返す
/// - `Network` / `Unexpected` と 4xx 以外の `App` は `fallback` を 500 で返す
///
/// `context` には操作名と対象 ID を含める（例: `"営業チームメンバー取得(member_id=...)"`）。
pub fn service_error_response(context: &str, fallback: &str, err: CoreServiceError) -> Response {
   match err {
      CoreServiceError::NotFound(message) => {
         tracing::debug!("{}: 対象が見つかりません: {}", context, message);
         not_found_response(&message)
      }
      CoreServiceError::ValidationError(message) => {
         tracing::debug!("{}: 入力エラー: {}", context, message);
         bad_request_response(&message)
      }
      CoreServiceError::Unauthorized(message) => {
         tracing::debug!("{}: 認証エラー: {}", context, message);
         error_response(StatusCode::UNAUTHORIZED, &message)
      }
      CoreServiceError::Forbidden(message) => {
         tracing::debug!("{}: 権限エラー: {}", context, message);
         forbidden_response(&message)
      }
      CoreServiceError::Conflict(message) => {
         tracing::debug!("{}: 競合: {}", context, message);
         conflict_response(&message)
      }
      CoreServiceError::App {
         status,
         code,
         message,
      } => match StatusCode::from_u16(status) {
         Ok(status) if status.is_client_error() => {
            tracing::debug!("{}: {} ({})", context, message, code);
            error_with_code_response(status, &message, &code)
         }
         _ => {
            tracing::error!(
               error.category = "external_service",
               error.kind = "application",
               "{}で内部エラー: {} ({})",
               context,
               message,
               code
            );
            internal_error_response(fallback)
         }
      },
      err @ (CoreServiceError::Network(_) | CoreServiceError::Unexpected(_)) => {
         tracing::error!(
            error.category = "external_service",
            error.kind = "service_communication",
            "{}で内部エラー: {}",
            context,
            err
         );
         internal_error_response(fallback)
      }
   }
}

#[cfg(test)]
mod tests {
   use axum::body::to_bytes;
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   async fn status_and_body(response: Response) -> (StatusCode, ErrorResponse) {
      let status = response.status();
      let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
      (status, error)
   }

   #[rstest]
   #[case(CoreServiceError::NotFound("ユーザーが見つかりません".to_string()), StatusCode::NOT_FOUND, "ユーザーが見つかりません")]
   #[case(CoreServiceError::ValidationError("不正です".to_string()), StatusCode::BAD_REQUEST, "不正です")]
   #[case(CoreServiceError::Unauthorized("認証失敗".to_string()), StatusCode::UNAUTHORIZED, "認証失敗")]
   #[case(CoreServiceError::Forbidden("権限なし".to_string()), StatusCode::FORBIDDEN, "権限なし")]
   #[case(CoreServiceError::Conflict("重複".to_string()), StatusCode::CONFLICT, "重複")]
   #[case(CoreServiceError::Network("connection refused".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "取得に失敗しました")]
   #[case(CoreServiceError::Unexpected("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR, "取得に失敗しました")]
   #[tokio::test]
   async fn test_service_error_responseはタグごとにステータスを決める(
      #[case] err: CoreServiceError,
      #[case] expected_status: StatusCode,
      #[case] expected_message: &str,
   ) {
      let response = service_error_response("テスト", "取得に失敗しました", err);

      let (status, body) = status_and_body(response).await;
      assert_eq!(status, expected_status);
      assert_eq!(body, ErrorResponse::new(expected_message));
   }

   #[tokio::test]
   async fn test_service_error_responseはappのコードを保持する() {
      let err = CoreServiceError::App {
         status:  422,
         code:    "P002B001".to_string(),
         message: "回答済みの質問は編集できません".to_string(),
      };

      let (status, body) = status_and_body(service_error_response("テスト", "失敗", err)).await;

      assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
      assert_eq!(
         body,
         ErrorResponse::with_code("回答済みの質問は編集できません", "P002B001")
      );
   }

   #[tokio::test]
   async fn test_service_error_responseは5xxのappを固定メッセージにする() {
      let err = CoreServiceError::App {
         status:  503,
         code:    "UPSTREAM".to_string(),
         message: "internal detail".to_string(),
      };

      let (status, body) = status_and_body(service_error_response("テスト", "失敗", err)).await;

      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(body, ErrorResponse::new("失敗"));
   }

   #[derive(validator::Validate)]
   struct Sample {
      #[validate(range(min = 1, message = "aは1以上です"))]
      a: i32,
      #[validate(range(max = 10, message = "bは10以下です"))]
      b: i32,
   }

   #[tokio::test]
   async fn test_validation_errors_responseはフィールド名順で最初のメッセージを返す() {
      use validator::Validate;
      let errors = Sample { a: 0, b: 11 }.validate().unwrap_err();

      let (status, body) = status_and_body(validation_errors_response(&errors)).await;

      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(body, ErrorResponse::new("aは1以上です"));
   }

   #[tokio::test]
   async fn test_not_implemented_responseは501とコードを返す() {
      let (status, body) = status_and_body(not_implemented_response("準備中です")).await;

      assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
      assert_eq!(body.code.as_deref(), Some("NOT_IMPLEMENTED"));
      assert_eq!(body.error, "準備中です");
   }
}
