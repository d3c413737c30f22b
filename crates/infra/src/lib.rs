//! # Kanri インフラ層
//!
//! 外部ストア（Redis）との接続・通信を担当する。
//!
//! ## 責務
//!
//! - **接続管理**: Redis の `ConnectionManager` 作成
//! - **セッション**: ログインセッションの保存・取得・削除
//! - **ログイン試行回数**: アカウントロック判定用の失敗カウンタ
//!
//! API 層はこのクレートのトレイト（[`SessionManager`], [`LoginAttemptStore`]）にのみ依存し、
//! Redis 実装は起動時に注入する。
//!
//! ## モジュール構成
//!
//! - [`redis`] - Redis 接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`session`] - セッション管理
//! - [`login_attempt`] - ログイン失敗カウンタ

pub mod error;
pub mod login_attempt;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod redis;
pub mod session;

pub use error::{InfraError, InfraErrorKind};
pub use login_attempt::{LoginAttemptStore, RedisLoginAttemptStore};
pub use session::{RedisSessionManager, SessionData, SessionManager};
