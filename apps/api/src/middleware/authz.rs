//! # 認可ミドルウェア
//!
//! [`authenticate_session`](super::authenticate_session) が付与した [`CurrentUser`] を検証する。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::{from_fn, from_fn_with_state};
//!
//! Router::new()
//!     .route("/api/v1/admin/weekly-reports/reminders/send", post(send_reminders))
//!     .route_layer(from_fn_with_state(AuthzState::new(ADMIN_ROLE), require_role))
//! ```
//!
//! `admin` ロールはすべてのロール要求を満たす。

use axum::{
   body::Body,
   extract::State,
   http::Request,
   middleware::Next,
   response::Response,
};

use super::authn::CurrentUser;
use crate::error::{forbidden_response, unauthorized_response};

/// 管理者ロール
pub const ADMIN_ROLE: &str = "admin";

/// ロール不足時のメッセージ
pub const FORBIDDEN_MESSAGE: &str = "この操作を実行する権限がありません";

/// 認可ミドルウェアの状態
#[derive(Debug, Clone)]
pub struct AuthzState {
   pub required_role: &'static str,
}

impl AuthzState {
   pub fn new(required_role: &'static str) -> Self {
      Self { required_role }
   }
}

/// 認証済みであることを要求するミドルウェア
///
/// セッションがない場合は 401 を返す。
pub async fn require_authenticated(request: Request<Body>, next: Next) -> Response {
   if request.extensions().get::<CurrentUser>().is_none() {
      return unauthorized_response();
   }

   next.run(request).await
}

/// 指定ロールを要求するミドルウェア
///
/// セッションがない場合は 401、ロールが不足している場合は 403 を返す。
pub async fn require_role(
   State(state): State<AuthzState>,
   request: Request<Body>,
   next: Next,
) -> Response {
   let Some(user) = request.extensions().get::<CurrentUser>() else {
      return unauthorized_response();
   };

   if !(user.has_role(state.required_role) || user.has_role(ADMIN_ROLE)) {
      tracing::debug!(
         user_id = %user.user_id,
         required_role = state.required_role,
         "ロール不足のためアクセスを拒否しました"
      );
      return forbidden_response(FORBIDDEN_MESSAGE);
   }

   next.run(request).await
}

#[cfg(test)]
mod tests {
   use axum::{
      Router,
      http::StatusCode,
      middleware::{from_fn, from_fn_with_state},
      response::IntoResponse,
      routing::get,
   };
   use rstest::rstest;
   use tower::ServiceExt;
   use uuid::Uuid;

   use super::*;

   async fn dummy_handler() -> impl IntoResponse {
      StatusCode::OK
   }

   fn user_with_roles(roles: &[&str]) -> CurrentUser {
      CurrentUser {
         user_id: Uuid::now_v7(),
         email:   "user@example.com".to_string(),
         name:    "テスト ユーザー".to_string(),
         roles:   roles.iter().map(|r| (*r).to_string()).collect(),
      }
   }

   fn request_as(user: Option<CurrentUser>) -> Request<Body> {
      let mut request = Request::get("/protected").body(Body::empty()).unwrap();
      if let Some(user) = user {
         request.extensions_mut().insert(user);
      }
      request
   }

   #[rstest]
   #[case(None, StatusCode::UNAUTHORIZED)]
   #[case(Some(user_with_roles(&["engineer"])), StatusCode::FORBIDDEN)]
   #[case(Some(user_with_roles(&["accounting"])), StatusCode::OK)]
   #[case(Some(user_with_roles(&["engineer", "admin"])), StatusCode::OK)]
   #[tokio::test]
   async fn test_require_roleはセッションとロールを検証する(
      #[case] user: Option<CurrentUser>,
      #[case] expected: StatusCode,
   ) {
      // Given
      let app = Router::new()
         .route("/protected", get(dummy_handler))
         .layer(from_fn_with_state(AuthzState::new("accounting"), require_role));

      // When
      let response = app.oneshot(request_as(user)).await.unwrap();

      // Then
      assert_eq!(response.status(), expected);
   }

   #[rstest]
   #[case(None, StatusCode::UNAUTHORIZED)]
   #[case(Some(user_with_roles(&[])), StatusCode::OK)]
   #[tokio::test]
   async fn test_require_authenticatedはセッションの有無のみ検証する(
      #[case] user: Option<CurrentUser>,
      #[case] expected: StatusCode,
   ) {
      let app = Router::new()
         .route("/protected", get(dummy_handler))
         .layer(from_fn(require_authenticated));

      let response = app.oneshot(request_as(user)).await.unwrap();

      assert_eq!(response.status(), expected);
   }
}
