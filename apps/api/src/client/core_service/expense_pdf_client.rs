//! 経費 PDF 関連の Core Service クライアント

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use super::{
   client_impl::CoreServiceClientImpl,
   error::CoreServiceError,
   response::handle_bytes_response,
   types::ExpenseListPdfFilter,
};
use crate::middleware::request_id::inject_request_id;

/// 経費 PDF 関連の Core Service クライアントトレイト
///
/// PDF のレンダリングは Core Service 側で行い、ここでは完成したバイト列を受け取る。
#[async_trait]
pub trait CoreServiceExpensePdfClient: Send + Sync {
   /// 経費申請 1 件の PDF を生成する
   ///
   /// Core Service の `GET /internal/expenses/{expense_id}/pdf` を呼び出す。
   async fn generate_expense_pdf(
      &self,
      user_id: Uuid,
      expense_id: Uuid,
   ) -> Result<Bytes, CoreServiceError>;

   /// 経費一覧の PDF を生成する
   ///
   /// Core Service の `GET /internal/expenses/pdf` を呼び出す。
   async fn generate_expense_list_pdf(
      &self,
      user_id: Uuid,
      filter: &ExpenseListPdfFilter,
   ) -> Result<Bytes, CoreServiceError>;
}

#[async_trait]
impl CoreServiceExpensePdfClient for CoreServiceClientImpl {
   async fn generate_expense_pdf(
      &self,
      user_id: Uuid,
      expense_id: Uuid,
   ) -> Result<Bytes, CoreServiceError> {
      let url = self.url(&format!("/expenses/{expense_id}/pdf"));

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_bytes_response(response).await
   }

   async fn generate_expense_list_pdf(
      &self,
      user_id: Uuid,
      filter: &ExpenseListPdfFilter,
   ) -> Result<Bytes, CoreServiceError> {
      let url = self.url("/expenses/pdf");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .query(filter)
         .send()
         .await?;
      handle_bytes_response(response).await
   }
}
