//! ユーザー・認証関連の Core Service クライアント

use async_trait::async_trait;
use kanri_shared::ApiResponse;
use uuid::Uuid;

use super::{
   client_impl::CoreServiceClientImpl,
   error::CoreServiceError,
   response::handle_response,
   types::{CreateUserCoreRequest, UpdateUserCoreRequest, UserDto, VerifyCredentialsCoreRequest},
};
use crate::middleware::request_id::inject_request_id;

/// ユーザー・認証関連の Core Service クライアントトレイト
#[async_trait]
pub trait CoreServiceUserClient: Send + Sync {
   /// 認証情報を検証する
   ///
   /// Core Service の `POST /internal/auth/verify` を呼び出す。
   /// 認証失敗は `Unauthorized` として返る。
   async fn verify_credentials(
      &self,
      req: &VerifyCredentialsCoreRequest,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError>;

   /// ユーザー情報を取得する
   ///
   /// Core Service の `GET /internal/users/{user_id}` を呼び出す。
   async fn get_user_by_id(&self, user_id: Uuid) -> Result<ApiResponse<UserDto>, CoreServiceError>;

   /// メールアドレスでユーザーを検索する
   ///
   /// Core Service の `GET /internal/users/by-email` を呼び出す。
   async fn get_user_by_email(
      &self,
      email: &str,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError>;

   /// ユーザーを作成する
   async fn create_user(
      &self,
      req: &CreateUserCoreRequest,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError>;

   /// ユーザー情報を更新する
   async fn update_user(
      &self,
      user_id: Uuid,
      req: &UpdateUserCoreRequest,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError>;

   /// アカウントのロックを解除する
   ///
   /// 解除対象のユーザー情報を返す。ログイン失敗回数のリセットは呼び出し側で行う。
   async fn unlock_account(&self, user_id: Uuid) -> Result<ApiResponse<UserDto>, CoreServiceError>;
}

#[async_trait]
impl CoreServiceUserClient for CoreServiceClientImpl {
   async fn verify_credentials(
      &self,
      req: &VerifyCredentialsCoreRequest,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError> {
      let url = self.url("/auth/verify");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_user_by_id(&self, user_id: Uuid) -> Result<ApiResponse<UserDto>, CoreServiceError> {
      let url = self.url(&format!("/users/{user_id}"));

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn get_user_by_email(
      &self,
      email: &str,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError> {
      let url = self.url(&format!(
         "/users/by-email?email={}",
         urlencoding::encode(email)
      ));

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn create_user(
      &self,
      req: &CreateUserCoreRequest,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError> {
      let url = self.url("/users");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn update_user(
      &self,
      user_id: Uuid,
      req: &UpdateUserCoreRequest,
   ) -> Result<ApiResponse<UserDto>, CoreServiceError> {
      let url = self.url(&format!("/users/{user_id}"));

      let response = inject_request_id(self.client.put(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn unlock_account(&self, user_id: Uuid) -> Result<ApiResponse<UserDto>, CoreServiceError> {
      let url = self.url(&format!("/users/{user_id}/unlock"));

      let response = inject_request_id(self.client.post(&url)).send().await?;
      handle_response(response).await
   }
}
