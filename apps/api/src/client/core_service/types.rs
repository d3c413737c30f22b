//! Core Service クライアントの DTO / リクエスト型
//!
//! Core Service から受け取った値はハンドラでそのままクライアントに返すため、
//! レスポンス DTO は `Serialize` / `Deserialize` の両方を実装し、フィールドを省略しない。

mod expense_pdf;
mod freee;
mod poc_sync;
mod proposal;
mod reminder;
mod sales_team;
mod user;

pub use expense_pdf::*;
pub use freee::*;
pub use poc_sync::*;
pub use proposal::*;
pub use reminder::*;
pub use sales_team::*;
pub use user::*;
