//! # ミドルウェア
//!
//! API サーバー用のミドルウェアを提供する。
//!
//! 適用順（外側から）: Request ID 採番 → トレース → Request ID 保存 →
//! `Cache-Control` → セッション解決 → ルート単位の認可。

mod authn;
mod authz;
mod cache_control;
pub mod request_id;

pub use authn::{AuthnState, CurrentUser, SESSION_COOKIE_NAME, authenticate_session};
pub use authz::{
   ADMIN_ROLE,
   AuthzState,
   FORBIDDEN_MESSAGE,
   require_authenticated,
   require_role,
};
pub use cache_control::no_store;
pub use request_id::store_request_id;
