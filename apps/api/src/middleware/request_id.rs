//! # Request ID 伝播ミドルウェア
//!
//! 受信リクエストの Request ID を Core Service への呼び出しに引き継ぐ。
//!
//! 1. `SetRequestIdLayer` がリクエストに [`RequestId`] を設定する（未指定なら UUID v7 を採番）
//! 2. [`store_request_id`] がその値を task-local に保存する
//! 3. Core Service クライアントは [`inject_request_id`] で `X-Request-Id` ヘッダーを付与する
//!
//! クライアントトレイトのシグネチャに Request ID を含めずに済むよう task-local を使う。

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use kanri_shared::observability::REQUEST_ID_HEADER;
use tower_http::request_id::RequestId;

tokio::task_local! {
   static REQUEST_ID: String;
}

/// 現在のリクエストの Request ID を取得する
///
/// task-local スコープ外（テスト・起動処理など）では `None` を返す。
pub fn current_request_id() -> Option<String> {
   REQUEST_ID.try_with(Clone::clone).ok()
}

/// Request ID を task-local に保存するミドルウェア
pub async fn store_request_id(request: Request<Body>, next: Next) -> Response {
   let request_id = request
      .extensions()
      .get::<RequestId>()
      .and_then(|id| id.header_value().to_str().ok())
      .unwrap_or("-")
      .to_string();

   REQUEST_ID.scope(request_id, next.run(request)).await
}

/// reqwest のリクエストビルダーに `X-Request-Id` ヘッダーを付与する
///
/// task-local スコープ外の場合はビルダーをそのまま返す。
pub fn inject_request_id(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
   match current_request_id() {
      Some(id) => builder.header(REQUEST_ID_HEADER, id),
      None => builder,
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_current_request_idはスコープ外でnoneを返す() {
      assert_eq!(current_request_id(), None);
   }

   #[tokio::test]
   async fn test_inject_request_idはスコープ内でヘッダーを付与する() {
      let client = reqwest::Client::new();

      let request = REQUEST_ID
         .scope("0192f3a0-7c1e-7000-8000-000000000001".to_string(), async {
            inject_request_id(client.get("http://core.internal/internal/users"))
               .build()
               .unwrap()
         })
         .await;

      assert_eq!(
         request.headers()[REQUEST_ID_HEADER],
         "0192f3a0-7c1e-7000-8000-000000000001"
      );
   }

   #[tokio::test]
   async fn test_inject_request_idはスコープ外でビルダーを変更しない() {
      let client = reqwest::Client::new();

      let request = inject_request_id(client.get("http://core.internal/internal/users"))
         .build()
         .unwrap();

      assert!(request.headers().get(REQUEST_ID_HEADER).is_none());
   }
}
