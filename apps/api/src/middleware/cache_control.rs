//! # キャッシュ制御ミドルウェア
//!
//! 認証情報や個人データを含むレスポンスがブラウザ・プロキシに残らないよう、
//! 全レスポンスに `Cache-Control: no-store` を設定する。

use axum::{
   extract::Request,
   http::{HeaderValue, header},
   middleware::Next,
   response::Response,
};

/// API レスポンスに `Cache-Control: no-store` を付与する
pub async fn no_store(request: Request, next: Next) -> Response {
   let mut response = next.run(request).await;
   response
      .headers_mut()
      .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
   response
}

#[cfg(test)]
mod tests {
   use axum::{
      Router,
      body::Body,
      http::{Request, StatusCode},
      middleware::from_fn,
      response::IntoResponse,
      routing::get,
   };
   use tower::ServiceExt;

   use super::*;

   async fn not_found_handler() -> impl IntoResponse {
      StatusCode::NOT_FOUND
   }

   #[tokio::test]
   async fn test_エラーレスポンスにもno_storeが付与される() {
      // Given
      let app = Router::new()
         .route("/missing", get(not_found_handler))
         .layer(from_fn(no_store));

      // When
      let response = app
         .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
         .await
         .unwrap();

      // Then
      assert_eq!(response.status(), StatusCode::NOT_FOUND);
      assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
   }
}
