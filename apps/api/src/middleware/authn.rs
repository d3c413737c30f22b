//! # 認証ミドルウェア
//!
//! `session_id` Cookie からセッションを解決し、[`CurrentUser`] をリクエストに付与する。
//!
//! セッションがない・期限切れの場合はそのまま次へ進める。401 を返すかどうかは
//! ルートごとの [`require_authenticated`](super::require_authenticated) や
//! ハンドラ側で判断する。

use std::sync::Arc;

use axum::{
   Json,
   body::Body,
   extract::State,
   http::{Request, StatusCode},
   middleware::Next,
   response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use kanri_infra::{SessionData, SessionManager};
use kanri_shared::ErrorResponse;
use uuid::Uuid;

/// セッション Cookie 名
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// 認証済みユーザー
///
/// 認証ミドルウェアがリクエスト extensions に格納する。
/// ハンドラは `Option<Extension<CurrentUser>>` で受け取る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
   pub user_id: Uuid,
   pub email:   String,
   pub name:    String,
   pub roles:   Vec<String>,
}

impl CurrentUser {
   /// 指定ロールを持つか
   pub fn has_role(&self, role: &str) -> bool {
      self.roles.iter().any(|r| r == role)
   }
}

impl From<&SessionData> for CurrentUser {
   fn from(session: &SessionData) -> Self {
      Self {
         user_id: session.user_id(),
         email:   session.email().to_string(),
         name:    session.name().to_string(),
         roles:   session.roles().to_vec(),
      }
   }
}

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthnState {
   pub session_manager: Arc<dyn SessionManager>,
}

/// セッションを解決して [`CurrentUser`] を付与するミドルウェア
///
/// セッションストアの障害時のみ 500 を返す。
pub async fn authenticate_session(
   State(state): State<AuthnState>,
   jar: CookieJar,
   mut request: Request<Body>,
   next: Next,
) -> Response {
   if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
      match state.session_manager.get(cookie.value()).await {
         Ok(Some(session)) => {
            request
               .extensions_mut()
               .insert(CurrentUser::from(&session));
         }
         Ok(None) => {
            tracing::debug!("セッションが見つからないため未認証として扱います");
         }
         Err(e) => {
            tracing::error!(
               error.category = "infrastructure",
               error.kind = "session",
               "セッション取得で内部エラー: {}",
               e
            );
            return (
               StatusCode::INTERNAL_SERVER_ERROR,
               Json(ErrorResponse::internal_error()),
            )
               .into_response();
         }
      }
   }

   next.run(request).await
}
