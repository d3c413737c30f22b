//! # Kanri 共有ユーティリティ
//!
//! API サーバー・インフラ層の双方から使われる共通型を提供する。
//!
//! ## 設計方針
//!
//! - レスポンスエンベロープ（エラー / メッセージ / 一覧）の JSON 形状をここで固定する
//! - axum への依存は持たない（`IntoResponse` 変換は API 側の責務）
//! - ビジネスロジックは含めない

pub mod api_response;
pub mod error_response;
pub mod health;
pub mod message_response;
pub mod observability;
pub mod paginated_response;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
pub use message_response::MessageResponse;
pub use paginated_response::{ListResponse, PageResponse};
