//! Core Service レスポンスの共通ハンドリング

use bytes::Bytes;
use kanri_shared::{ApiResponse, ErrorResponse};
use serde::de::DeserializeOwned;

use super::error::CoreServiceError;

/// `{ "data": T }` 形式のレスポンスを処理する
///
/// 成功時はレスポンスボディを `ApiResponse<T>` にデシリアライズし、
/// エラー時は [`CoreServiceError::from_status`] で分類したエラーを返す。
pub(super) async fn handle_response<T: DeserializeOwned>(
   response: reqwest::Response,
) -> Result<ApiResponse<T>, CoreServiceError> {
   if response.status().is_success() {
      let body = response.json::<ApiResponse<T>>().await?;
      return Ok(body);
   }

   Err(error_from_response(response).await)
}

/// ペイロードを持たないコマンドのレスポンスを処理する
pub(super) async fn handle_empty_response(
   response: reqwest::Response,
) -> Result<(), CoreServiceError> {
   if response.status().is_success() {
      return Ok(());
   }

   Err(error_from_response(response).await)
}

/// バイナリ（PDF）レスポンスを処理する
///
/// ボディ全体を受信し終えてから返す。途中で失敗した場合は `Network` になる。
pub(super) async fn handle_bytes_response(
   response: reqwest::Response,
) -> Result<Bytes, CoreServiceError> {
   if response.status().is_success() {
      let body = response.bytes().await?;
      return Ok(body);
   }

   Err(error_from_response(response).await)
}

/// エラーレスポンスを `CoreServiceError` に変換する
///
/// 本文が `{ "error": ..., "code"?: ... }` ならその値を、そうでなければ本文全体を
/// メッセージとして扱う。
async fn error_from_response(response: reqwest::Response) -> CoreServiceError {
   let status = response.status().as_u16();
   let body = response.text().await.unwrap_or_default();

   let (message, code) = match serde_json::from_str::<ErrorResponse>(&body) {
      Ok(error) => (error.error, error.code),
      Err(_) => (body.trim().to_string(), None),
   };

   CoreServiceError::from_status(status, message, code)
}
