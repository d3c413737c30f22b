//! 提案・質問関連の Core Service クライアント

use async_trait::async_trait;
use kanri_shared::{ApiResponse, ListResponse};
use uuid::Uuid;

use super::{
   client_impl::CoreServiceClientImpl,
   error::CoreServiceError,
   response::{handle_empty_response, handle_response},
   types::{
      AssignQuestionCoreRequest,
      PageQuery,
      ProposalDetailDto,
      ProposalItemDto,
      ProposalListQuery,
      ProposalStatisticsQuery,
      ProposalSummaryDto,
      QuestionDto,
      QuestionTextCoreRequest,
      RespondQuestionCoreRequest,
      UpdateProposalStatusCoreRequest,
   },
};
use crate::middleware::request_id::inject_request_id;

/// 提案・質問関連の Core Service クライアントトレイト
///
/// 提案・質問の状態遷移（回答済み質問の編集不可など）は Core Service が判定し、
/// 違反時はエラーコード付きのエラー（`P002B001` など）を返す。
#[async_trait]
pub trait CoreServiceProposalClient: Send + Sync {
   /// 提案一覧を取得する
   ///
   /// Core Service の `GET /internal/proposals` を呼び出す。
   async fn get_proposals(
      &self,
      user_id: Uuid,
      query: &ProposalListQuery,
   ) -> Result<ApiResponse<ListResponse<ProposalItemDto>>, CoreServiceError>;

   /// 提案詳細を取得する
   async fn get_proposal_detail(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
   ) -> Result<ApiResponse<ProposalDetailDto>, CoreServiceError>;

   /// 提案ステータスを更新する
   async fn update_proposal_status(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
      req: &UpdateProposalStatusCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// 提案に質問を作成する
   async fn create_question(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
      req: &QuestionTextCoreRequest,
   ) -> Result<ApiResponse<QuestionDto>, CoreServiceError>;

   /// 提案の質問一覧を取得する
   async fn get_questions(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
      page: PageQuery,
   ) -> Result<ApiResponse<ListResponse<QuestionDto>>, CoreServiceError>;

   /// 質問を更新する
   async fn update_question(
      &self,
      user_id: Uuid,
      question_id: Uuid,
      req: &QuestionTextCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// 質問を削除する
   async fn delete_question(
      &self,
      user_id: Uuid,
      question_id: Uuid,
   ) -> Result<(), CoreServiceError>;

   /// 質問に回答する（営業担当）
   async fn respond_to_question(
      &self,
      user_id: Uuid,
      question_id: Uuid,
      req: &RespondQuestionCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// 未回答の質問一覧を取得する（営業担当）
   async fn get_pending_questions(
      &self,
      user_id: Uuid,
      page: PageQuery,
   ) -> Result<ApiResponse<ListResponse<QuestionDto>>, CoreServiceError>;

   /// 質問を営業担当に割り当てる
   async fn assign_question_to_sales(
      &self,
      user_id: Uuid,
      question_id: Uuid,
      req: &AssignQuestionCoreRequest,
   ) -> Result<(), CoreServiceError>;

   /// 提案の集計を取得する
   async fn get_proposal_stats(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<ProposalSummaryDto>, CoreServiceError>;

   /// ダッシュボード用の提案データを取得する
   async fn get_proposal_dashboard(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<ProposalSummaryDto>, CoreServiceError>;

   /// エンジニアの進行中提案を取得する
   async fn get_active_proposals_by_engineer(
      &self,
      user_id: Uuid,
      engineer_id: Uuid,
   ) -> Result<ApiResponse<Vec<ProposalItemDto>>, CoreServiceError>;

   /// 並行提案（同一エンジニアへの複数提案）を取得する
   async fn get_parallel_proposals(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<Vec<ProposalItemDto>>, CoreServiceError>;

   /// 期間指定の提案統計を取得する
   async fn get_proposal_statistics(
      &self,
      user_id: Uuid,
      query: &ProposalStatisticsQuery,
   ) -> Result<ApiResponse<ProposalSummaryDto>, CoreServiceError>;

   /// 回答期限が近い提案を取得する
   async fn get_upcoming_deadlines(
      &self,
      user_id: Uuid,
      days: u32,
   ) -> Result<ApiResponse<Vec<ProposalItemDto>>, CoreServiceError>;
}

#[async_trait]
impl CoreServiceProposalClient for CoreServiceClientImpl {
   async fn get_proposals(
      &self,
      user_id: Uuid,
      query: &ProposalListQuery,
   ) -> Result<ApiResponse<ListResponse<ProposalItemDto>>, CoreServiceError> {
      let url = self.url("/proposals");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .query(query)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_proposal_detail(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
   ) -> Result<ApiResponse<ProposalDetailDto>, CoreServiceError> {
      let url = self.url(&format!("/proposals/{proposal_id}"));

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn update_proposal_status(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
      req: &UpdateProposalStatusCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!("/proposals/{proposal_id}/status"));

      let response = inject_request_id(self.client.put(&url))
         .query(&[("user_id", user_id)])
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn create_question(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
      req: &QuestionTextCoreRequest,
   ) -> Result<ApiResponse<QuestionDto>, CoreServiceError> {
      let url = self.url(&format!("/proposals/{proposal_id}/questions"));

      let response = inject_request_id(self.client.post(&url))
         .query(&[("user_id", user_id)])
         .json(req)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_questions(
      &self,
      user_id: Uuid,
      proposal_id: Uuid,
      page: PageQuery,
   ) -> Result<ApiResponse<ListResponse<QuestionDto>>, CoreServiceError> {
      let url = self.url(&format!("/proposals/{proposal_id}/questions"));

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .query(&page)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn update_question(
      &self,
      user_id: Uuid,
      question_id: Uuid,
      req: &QuestionTextCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!("/questions/{question_id}"));

      let response = inject_request_id(self.client.put(&url))
         .query(&[("user_id", user_id)])
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn delete_question(
      &self,
      user_id: Uuid,
      question_id: Uuid,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!("/questions/{question_id}"));

      let response = inject_request_id(self.client.delete(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn respond_to_question(
      &self,
      user_id: Uuid,
      question_id: Uuid,
      req: &RespondQuestionCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!("/questions/{question_id}/response"));

      let response = inject_request_id(self.client.put(&url))
         .query(&[("user_id", user_id)])
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn get_pending_questions(
      &self,
      user_id: Uuid,
      page: PageQuery,
   ) -> Result<ApiResponse<ListResponse<QuestionDto>>, CoreServiceError> {
      let url = self.url("/questions/pending");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .query(&page)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn assign_question_to_sales(
      &self,
      user_id: Uuid,
      question_id: Uuid,
      req: &AssignQuestionCoreRequest,
   ) -> Result<(), CoreServiceError> {
      let url = self.url(&format!("/questions/{question_id}/assign"));

      let response = inject_request_id(self.client.put(&url))
         .query(&[("user_id", user_id)])
         .json(req)
         .send()
         .await?;
      handle_empty_response(response).await
   }

   async fn get_proposal_stats(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<ProposalSummaryDto>, CoreServiceError> {
      let url = self.url("/proposals/stats");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_proposal_dashboard(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<ProposalSummaryDto>, CoreServiceError> {
      let url = self.url("/proposals/dashboard");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_active_proposals_by_engineer(
      &self,
      user_id: Uuid,
      engineer_id: Uuid,
   ) -> Result<ApiResponse<Vec<ProposalItemDto>>, CoreServiceError> {
      let url = self.url(&format!("/proposals/engineers/{engineer_id}/active"));

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_parallel_proposals(
      &self,
      user_id: Uuid,
   ) -> Result<ApiResponse<Vec<ProposalItemDto>>, CoreServiceError> {
      let url = self.url("/proposals/parallel");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_proposal_statistics(
      &self,
      user_id: Uuid,
      query: &ProposalStatisticsQuery,
   ) -> Result<ApiResponse<ProposalSummaryDto>, CoreServiceError> {
      let url = self.url("/proposals/statistics");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .query(query)
         .send()
         .await?;
      handle_response(response).await
   }

   async fn get_upcoming_deadlines(
      &self,
      user_id: Uuid,
      days: u32,
   ) -> Result<ApiResponse<Vec<ProposalItemDto>>, CoreServiceError> {
      let url = self.url("/proposals/deadlines/upcoming");

      let response = inject_request_id(self.client.get(&url))
         .query(&[("user_id", user_id)])
         .query(&[("days", days)])
         .send()
         .await?;
      handle_response(response).await
   }
}
