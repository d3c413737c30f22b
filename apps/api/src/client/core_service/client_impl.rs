//! CoreServiceClient スーパートレイトとクライアント実装の構造体

use super::{
   expense_pdf_client::CoreServiceExpensePdfClient,
   freee_client::CoreServiceFreeeClient,
   poc_sync_client::CoreServicePocSyncClient,
   proposal_client::CoreServiceProposalClient,
   reminder_client::CoreServiceReminderClient,
   sales_team_client::CoreServiceSalesTeamClient,
   user_client::CoreServiceUserClient,
};

/// Core Service クライアントトレイト（スーパートレイト）
///
/// 業務領域ごとのサブトレイトを束ねる。ハンドラの State はサブトレイト単位で
/// 保持するため、テストでは必要な領域だけをスタブすればよい。
pub trait CoreServiceClient:
   CoreServiceExpensePdfClient
   + CoreServiceFreeeClient
   + CoreServicePocSyncClient
   + CoreServiceProposalClient
   + CoreServiceReminderClient
   + CoreServiceSalesTeamClient
   + CoreServiceUserClient
{
}

impl<T> CoreServiceClient for T where
   T: CoreServiceExpensePdfClient
      + CoreServiceFreeeClient
      + CoreServicePocSyncClient
      + CoreServiceProposalClient
      + CoreServiceReminderClient
      + CoreServiceSalesTeamClient
      + CoreServiceUserClient
{
}

/// Core Service クライアント実装
#[derive(Clone)]
pub struct CoreServiceClientImpl {
   pub(super) base_url: String,
   pub(super) client:   reqwest::Client,
}

impl CoreServiceClientImpl {
   /// 新しい CoreServiceClient を作成する
   ///
   /// # 引数
   ///
   /// - `base_url`: Core Service のベース URL（例: `http://localhost:13001`）
   pub fn new(base_url: &str) -> Self {
      Self {
         base_url: base_url.trim_end_matches('/').to_string(),
         client:   reqwest::Client::new(),
      }
   }

   /// 内部 API の URL を組み立てる
   pub(super) fn url(&self, path: &str) -> String {
      format!("{}/internal{}", self.base_url, path)
   }
}
