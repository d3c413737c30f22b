//! 営業チーム関連の Core Service クライアント

use async_trait::async_trait;
use kanri_shared::{ApiResponse, ListResponse};

use super::{
   client_impl::CoreServiceClientImpl,
   error::CoreServiceError,
   response::{handle_empty_response, handle_response},
   types::{
      CreateSalesTeamMemberRequest,
      MemberActorCoreRequest,
      SalesTeamMemberDto,
      SalesTeamMemberFilter,
      SalesTeamStatisticsDto,
      UpdateSalesTeamMemberRequest,
   },
};
use crate::middleware::request_id::inject_request_id;

/// 営業チーム関連の Core Service クライアントトレイト
///
/// メンバー ID・ユーザー ID は Core Service 側の採番形式に依存するため文字列で扱う。
#[async_trait]
pub trait CoreServiceSalesTeamClient: Send + Sync {
   /// メンバーを追加する
   ///
   /// Core Service の `POST /internal/sales/team/members` を呼び出す。
   async fn create_member(
      &self,
      req: &CreateSalesTeamMemberRequest,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError>;

   /// メンバーを取得する
   async fn get_member(
      &self,
      member_id: &str,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError>;

   /// ユーザー ID からメンバーを取得する
   async fn get_member_by_user_id(
      &self,
      user_id: &str,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError>;

   /// メンバーを更新する
   async fn update_member(
      &self,
      member_id: &str,
      req: &UpdateSalesTeamMemberRequest,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError>;

   /// メンバーを削除する
   async fn delete_member(
      &self,
      member_id: &str,
      deleted_by: &str,
   ) -> Result<(), CoreServiceError>;

   /// メンバーをアクティブ化する
   async fn activate_member(
      &self,
      member_id: &str,
      activated_by: &str,
   ) -> Result<(), CoreServiceError>;

   /// メンバーを非アクティブ化する
   async fn deactivate_member(
      &self,
      member_id: &str,
      deactivated_by: &str,
   ) -> Result<(), CoreServiceError>;

   /// メンバー一覧を取得する
   async fn get_member_list(
      &self,
      filter: &SalesTeamMemberFilter,
   ) -> Result<ApiResponse<ListResponse<SalesTeamMemberDto>>, CoreServiceError>;

   /// アクティブなメンバーを取得する
   async fn get_active_members(
      &self,
   ) -> Result<ApiResponse<Vec<SalesTeamMemberDto>>, CoreServiceError>;

   /// 指定ロールのメンバーを取得する
   async fn get_members_by_role(
      &self,
      team_role: &str,
   ) -> Result<ApiResponse<Vec<SalesTeamMemberDto>>, CoreServiceError>;

   /// チーム統計を取得する
   async fn get_team_statistics(
      &self,
   ) -> Result<ApiResponse<SalesTeamStatisticsDto>, CoreServiceError>;
}

#[async_trait]
impl CoreServiceSalesTeamClient for CoreServiceClientImpl {
   async fn create_member(
      &self,
      req: &CreateSalesTeamMemberRequest,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError> {
      let url = self.url("/sales/team/members");

      let response = inject_request_id(self.client.post(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_member(
      &self,
      member_id: &str,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError> {
      let url = self.url(&format!(
         "/sales/team/members/{}",
         urlencoding::encode(member_id)
      ));

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn get_member_by_user_id(
      &self,
      user_id: &str,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError> {
      let url = self.url(&format!(
         "/sales/team/users/{}/member",
         urlencoding::encode(user_id)
      ));

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn update_member(
      &self,
      member_id: &str,
      req: &UpdateSalesTeamMemberRequest,
   ) -> Result<ApiResponse<SalesTeamMemberDto>, CoreServiceError> {
      let url = self.url(&format!(
         "/sales/team/members/{}",
         urlencoding::encode(member_id)
      ));

      let response = inject_request_id(self.client.put(&url))
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn delete_member(
      &self,
      member_id: &str,
      deleted_by: &str,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!(
         "/sales/team/members/{}",
         urlencoding::encode(member_id)
      ));
      let body = MemberActorCoreRequest {
         actor: deleted_by.to_string(),
      };

      let response = inject_request_id(self.client.delete(&url))
         .json(&body)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn activate_member(
      &self,
      member_id: &str,
      activated_by: &str,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!(
         "/sales/team/members/{}/activate",
         urlencoding::encode(member_id)
      ));
      let body = MemberActorCoreRequest {
         actor: activated_by.to_string(),
      };

      let response = inject_request_id(self.client.post(&url))
         .json(&body)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn deactivate_member(
      &self,
      member_id: &str,
      deactivated_by: &str,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!(
         "/sales/team/members/{}/deactivate",
         urlencoding::encode(member_id)
      ));
      let body = MemberActorCoreRequest {
         actor: deactivated_by.to_string(),
      };

      let response = inject_request_id(self.client.post(&url))
         .json(&body)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn get_member_list(
      &self,
      filter: &SalesTeamMemberFilter,
   ) -> Result<ApiResponse<ListResponse<SalesTeamMemberDto>>, CoreServiceError> {
      let url = self.url("/sales/team/members");

      let response = inject_request_id(self.client.get(&url))
         .query(filter)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_active_members(
      &self,
   ) -> Result<ApiResponse<Vec<SalesTeamMemberDto>>, CoreServiceError> {
      let url = self.url("/sales/team/members/active");

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn get_members_by_role(
      &self,
      team_role: &str,
   ) -> Result<ApiResponse<Vec<SalesTeamMemberDto>>, CoreServiceError> {
      let url = self.url(&format!(
         "/sales/team/members/roles/{}",
         urlencoding::encode(team_role)
      ));

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }

   async fn get_team_statistics(
      &self,
   ) -> Result<ApiResponse<SalesTeamStatisticsDto>, CoreServiceError> {
      let url = self.url("/sales/team/statistics");

      let response = inject_request_id(self.client.get(&url)).send().await?;
      handle_response(response).await
   }
}
