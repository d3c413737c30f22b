//! # 外部 API クライアント
//!
//! Core Service との通信を担当する。

pub mod core_service;

pub use core_service::{
   CoreServiceClient,
   CoreServiceClientImpl,
   CoreServiceError,
   CoreServiceExpensePdfClient,
   CoreServiceFreeeClient,
   CoreServicePocSyncClient,
   CoreServiceProposalClient,
   CoreServiceReminderClient,
   CoreServiceSalesTeamClient,
   CoreServiceUserClient,
};
