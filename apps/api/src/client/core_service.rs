//! # Core Service クライアント
//!
//! API から Core Service への通信を担当する。
//!
//! 業務領域ごとにサブトレイトを分け、[`CoreServiceClient`] で束ねる。
//! 成功レスポンスは `{ "data": T }` 形式、PDF はバイト列で受け取る。

mod client_impl;
mod error;
mod expense_pdf_client;
mod freee_client;
mod poc_sync_client;
mod proposal_client;
mod reminder_client;
mod response;
mod sales_team_client;
mod types;
mod user_client;

pub use client_impl::{CoreServiceClient, CoreServiceClientImpl};
pub use error::CoreServiceError;
pub use expense_pdf_client::CoreServiceExpensePdfClient;
pub use freee_client::CoreServiceFreeeClient;
pub use poc_sync_client::CoreServicePocSyncClient;
pub use proposal_client::CoreServiceProposalClient;
pub use reminder_client::CoreServiceReminderClient;
pub use sales_team_client::CoreServiceSalesTeamClient;
pub use types::*;
pub use user_client::CoreServiceUserClient;
