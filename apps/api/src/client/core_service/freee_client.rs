//! freee 連携関連の Core Service クライアント

use async_trait::async_trait;
use kanri_shared::ApiResponse;
use uuid::Uuid;

use super::{
   client_impl::CoreServiceClientImpl,
   error::CoreServiceError,
   response::{handle_empty_response, handle_response},
   types::{
      FreeeCompanyDto,
      FreeeConnectionStatusDto,
      FreeeConnectionTestDto,
      FreeeOAuthCompleteCoreRequest,
      FreeeOAuthInitiateCoreRequest,
      FreeeOAuthInitiateDto,
      FreeeSelectCompanyCoreRequest,
   },
};
use crate::middleware::request_id::inject_request_id;

/// freee 連携関連の Core Service クライアントトレイト
///
/// OAuth トークンの保管・更新や freee API との通信はすべて Core Service が担う。
#[async_trait]
pub trait CoreServiceFreeeClient: Send + Sync {
   /// 連携状態を取得する
   ///
   /// Core Service の `GET /internal/freee/status` を呼び出す。
   async fn get_freee_connection_status(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<FreeeConnectionStatusDto>, CoreServiceError>;

   /// OAuth 認可フローを開始する
   ///
   /// Core Service の `POST /internal/freee/oauth/initiate` を呼び出す。
   async fn initiate_freee_oauth(
      &self,
      req: &FreeeOAuthInitiateCoreRequest,
   ) -> Result<ApiResponse<FreeeOAuthInitiateDto>, CoreServiceError>;

   /// OAuth コールバックの認可コードを交換する
   ///
   /// Core Service の `POST /internal/freee/oauth/complete` を呼び出す。
   async fn complete_freee_oauth(
      &self,
      req: &FreeeOAuthCompleteCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// freee API への疎通を確認する
   async fn test_freee_connection(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<FreeeConnectionTestDto>, CoreServiceError>;

   /// 連携可能な事業所一覧を取得する
   async fn get_freee_companies(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<Vec<FreeeCompanyDto>>, CoreServiceError>;

   /// 連携先の事業所を選択する
   async fn select_freee_company(
      &self,
      req: &FreeeSelectCompanyCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// 連携を解除する
   ///
   /// Core Service の `DELETE /internal/freee/connection` を呼び出す。
   async fn disconnect_freee(&self, user_id: Uuid) -> Result<(), CoreServiceError>;
}

#[async_trait]
impl CoreServiceFreeeClient for CoreServiceClientImpl {
   async fn get_freee_connection_status(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<FreeeConnectionStatusDto>, CoreServiceError> {
      let url = self.url("/freee/status");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn initiate_freee_oauth(
      &self,
      req: &FreeeOAuthInitiateCoreRequest,
   ) -> Result<ApiResponse<FreeeOAuthInitiateDto>, CoreServiceError> {
      let url = self.url("/freee/oauth/initiate");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn complete_freee_oauth(
      &self,
      req: &FreeeOAuthCompleteCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url("/freee/oauth/complete");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn test_freee_connection(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<FreeeConnectionTestDto>, CoreServiceError> {
      let url = self.url("/freee/test");

      let response = inject_request_id(self.client.post(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_freee_companies(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<Vec<FreeeCompanyDto>>, CoreServiceError> {
      let url = self.url("/freee/companies");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn select_freee_company(
      &self,
      req: &FreeeSelectCompanyCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url("/freee/companies/select");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn disconnect_freee(&self, user_id: Uuid) -> Result<(), CoreServiceError> {
      let url = self.url("/freee/connection");

      let response = inject_request_id(self.client.delete(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_empty_response(response).await
   }
}
