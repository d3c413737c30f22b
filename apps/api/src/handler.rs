//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 業務領域ごとにサブモジュールに配置し、State をここで re-export する
//! - 領域をまたいで同名のハンドラ（`get_sync_history` など）があるため、
//!   ハンドラ関数はモジュールパス付きで参照する
//! - ハンドラは薄く保ち、業務ルールは Core Service に委譲する
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `expense_pdf`: 経費 PDF 出力
//! - `freee`: freee 連携
//! - `poc_sync`: POC プロジェクト同期
//! - `proposal`: 提案・質問
//! - `reminder`: 週報リマインド
//! - `sales_team`: 営業チーム管理
//! - `user`: 認証・ユーザー管理

pub mod expense_pdf;
pub mod freee;
pub mod health;
pub mod poc_sync;
pub mod proposal;
pub mod reminder;
pub mod sales_team;
pub mod user;

pub use expense_pdf::ExpensePdfState;
pub use freee::FreeeState;
pub use health::{ReadinessState, health_check, readiness_check};
pub use poc_sync::PocSyncState;
pub use proposal::ProposalState;
pub use reminder::ReminderState;
pub use sales_team::SalesTeamState;
pub use user::UserState;
