//! # 提案ハンドラ
//!
//! エンジニア向けの提案閲覧・回答・質問と、営業担当向けの質問回答・割り当て・
//! 統計のエンドポイント。すべて認証必須で、ユーザー ID を Core Service に渡す。
//!
//! 提案ステータス（`pending` → `responded` → `proceed` / `declined`）と質問の編集可否は
//! Core Service が判定する。ここではパス・クエリ・ボディの形だけを検証し、
//! エラーコード付きのエラーはコードを保ったまま中継する。
//!
//! ## エラーコード
//!
//! | コード | 内容 |
//! |---|---|
//! | `P001V001` | 提案 ID が UUID でない |
//! | `P001V003` | ユーザー ID が UUID でない |
//! | `P001V004` | 提案ステータスが不正 |
//! | `P001V005` | 期間指定が不正 |
//! | `P003V001` | 質問 ID が UUID でない |
//! | `P003V003` / `P003V004` | 質問文が長すぎる / 空 |
//! | `P003V005` / `P003V006` | 回答が空 / 長すぎる |

use std::{str::FromStr, sync::Arc};

use axum::{
   Extension,
   Json,
   extract::{Path, Query, State, rejection::JsonRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use kanri_shared::{ListResponse, PageResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
   client::{
      CoreServiceProposalClient,
      core_service::{
         AssignQuestionCoreRequest,
         PageQuery,
         ProposalListQuery,
         ProposalSortBy,
         ProposalStatisticsQuery,
         ProposalStatus,
         QuestionTextCoreRequest,
         RespondQuestionCoreRequest,
         SortOrder,
         UpdateProposalStatusCoreRequest,
      },
   },
   error::{
      INVALID_REQUEST_MESSAGE,
      bad_request_response,
      error_with_code_response,
      message_response,
      not_implemented_response,
      service_error_response,
      unauthorized_response,
   },
   middleware::CurrentUser,
   params::{Pagination, non_blank, parse_rfc3339},
};

/// 質問文・回答文の最大文字数
pub const MAX_TEXT_LENGTH: usize = 2000;

/// 期限が近い提案の既定日数
pub const DEFAULT_DEADLINE_DAYS: u32 = 7;

/// 期限が近い提案の最大日数
pub const MAX_DEADLINE_DAYS: u32 = 90;

const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// 提案 API の共有状態
pub struct ProposalState {
   pub core_service_client: Arc<dyn CoreServiceProposalClient>,
}

// --- リクエスト型 ---

/// 提案一覧のクエリ
#[derive(Debug, Default, Deserialize)]
pub struct ProposalListRequestQuery {
   pub status:     Option<String>,
   pub page:       Option<String>,
   pub limit:      Option<String>,
   pub sort_by:    Option<String>,
   pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageRequestQuery {
   pub page:  Option<String>,
   pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsRequestQuery {
   pub start_date: Option<String>,
   pub end_date:   Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeadlineRequestQuery {
   pub days: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProposalStatusRequest {
   #[serde(default)]
   pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionTextRequest {
   #[serde(default)]
   pub question_text: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondQuestionRequest {
   #[serde(default)]
   pub response_text: String,
}

#[derive(Debug, Deserialize)]
pub struct AssignQuestionRequest {
   #[serde(default)]
   pub sales_user_id: String,
}

// --- 入力チェック ---

fn code_error(message: &str, code: &str) -> Response {
   error_with_code_response(StatusCode::BAD_REQUEST, message, code)
}

fn parse_proposal_id(raw: &str) -> Result<Uuid, Response> {
   Uuid::parse_str(raw.trim()).map_err(|_| code_error("無効な提案IDです", "P001V001"))
}

fn parse_question_id(raw: &str) -> Result<Uuid, Response> {
   Uuid::parse_str(raw.trim()).map_err(|_| code_error("無効な質問IDです", "P003V001"))
}

/// 空でなく `MAX_TEXT_LENGTH` 文字以内であることを確認する
///
/// 文字数は Unicode スカラ値で数える。空白のみは空とみなす。
fn check_text(
   text: &str,
   empty: (&str, &str),
   too_long: (&str, &str),
) -> Result<(), Response> {
   if text.trim().is_empty() {
      return Err(code_error(empty.0, empty.1));
   }
   if text.chars().count() > MAX_TEXT_LENGTH {
      return Err(code_error(too_long.0, too_long.1));
   }
   Ok(())
}

fn check_question_text(text: &str) -> Result<(), Response> {
   check_text(
      text,
      ("質問文が空です", "P003V004"),
      ("質問文が長すぎます（最大2000文字）", "P003V003"),
   )
}

/// `days` を 1..=90 に収める（未指定・数値でない場合は 7）
fn parse_deadline_days(raw: Option<&str>) -> u32 {
   match non_blank(raw).and_then(|value| value.parse::<i64>().ok()) {
      Some(days) => days.clamp(1, i64::from(MAX_DEADLINE_DAYS)) as u32,
      None => DEFAULT_DEADLINE_DAYS,
   }
}

fn page_query(pagination: Pagination) -> PageQuery {
   PageQuery {
      page:  pagination.page,
      limit: pagination.limit,
   }
}

fn page_response<T: serde::Serialize>(list: ListResponse<T>, pagination: Pagination) -> Response {
   Json(PageResponse::new(
      list.items,
      list.total,
      pagination.page,
      pagination.limit,
   ))
   .into_response()
}

// --- 提案 ---

/// GET /api/v1/proposals
///
/// `/api/v1/sales/engineer-proposals`, `/api/v1/sales/proposals` からも登録される。
pub async fn get_proposals(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Query(query): Query<ProposalListRequestQuery>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   let status = match non_blank(query.status.as_deref()) {
      Some(raw) => match ProposalStatus::from_str(raw) {
         Ok(status) => Some(status),
         Err(_) => return code_error("無効な提案ステータスです", "P001V004"),
      },
      None => None,
   };
   let sort_by = match non_blank(query.sort_by.as_deref()) {
      Some(raw) => match ProposalSortBy::from_str(raw) {
         Ok(sort_by) => sort_by,
         Err(_) => return code_error("並び替えキーが不正です", VALIDATION_ERROR),
      },
      None => ProposalSortBy::default(),
   };
   let sort_order = match non_blank(query.sort_order.as_deref()) {
      Some(raw) => match SortOrder::from_str(raw) {
         Ok(sort_order) => sort_order,
         Err(_) => return code_error("並び順が不正です", VALIDATION_ERROR),
      },
      None => SortOrder::default(),
   };
   let pagination = Pagination::standard(query.page.as_deref(), query.limit.as_deref());

   let core_query = ProposalListQuery {
      status,
      page: pagination.page,
      limit: pagination.limit,
      sort_by,
      sort_order,
   };
   match state
      .core_service_client
      .get_proposals(user.user_id, &core_query)
      .await
   {
      Ok(core_response) => page_response(core_response.data, pagination),
      Err(e) => service_error_response(
         &format!("提案一覧取得(user_id={})", user.user_id),
         "提案一覧の取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/proposals/{id}
pub async fn get_proposal_detail(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let proposal_id = match parse_proposal_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };

   match state
      .core_service_client
      .get_proposal_detail(user.user_id, proposal_id)
      .await
   {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("提案詳細取得(proposal_id={proposal_id})"),
         "提案詳細の取得に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/proposals/{id}/status
///
/// 指定できるのは `proceed` / `declined` のみ。
pub async fn update_proposal_status(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
   payload: Result<Json<UpdateProposalStatusRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let proposal_id = match parse_proposal_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   let status = match ProposalStatus::from_str(req.status.trim()) {
      Ok(status @ (ProposalStatus::Proceed | ProposalStatus::Declined)) => status,
      _ => return code_error("無効な提案ステータスです", "P001V004"),
   };

   let core_req = UpdateProposalStatusCoreRequest { status };
   match state
      .core_service_client
      .update_proposal_status(user.user_id, proposal_id, &core_req)
      .await
   {
      Ok(()) => message_response("提案ステータスを更新しました"),
      Err(e) => service_error_response(
         &format!("提案ステータス更新(proposal_id={proposal_id}, status={status})"),
         "提案ステータスの更新に失敗しました",
         e,
      ),
   }
}

// --- 質問 ---

/// POST /api/v1/proposals/{id}/questions
pub async fn create_question(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
   payload: Result<Json<QuestionTextRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let proposal_id = match parse_proposal_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(response) = check_question_text(&req.question_text) {
      return response;
   }

   let core_req = QuestionTextCoreRequest {
      question_text: req.question_text,
   };
   match state
      .core_service_client
      .create_question(user.user_id, proposal_id, &core_req)
      .await
   {
      Ok(core_response) => (StatusCode::CREATED, Json(core_response.data)).into_response(),
      Err(e) => service_error_response(
         &format!("質問作成(proposal_id={proposal_id})"),
         "質問の作成に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/proposals/{id}/questions
pub async fn get_questions(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
   Query(query): Query<PageRequestQuery>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let proposal_id = match parse_proposal_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };
   let pagination = Pagination::standard(query.page.as_deref(), query.limit.as_deref());

   match state
      .core_service_client
      .get_questions(user.user_id, proposal_id, page_query(pagination))
      .await
   {
      Ok(core_response) => page_response(core_response.data, pagination),
      Err(e) => service_error_response(
         &format!("質問一覧取得(proposal_id={proposal_id})"),
         "質問一覧の取得に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/questions/{id}
pub async fn update_question(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
   payload: Result<Json<QuestionTextRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let question_id = match parse_question_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(response) = check_question_text(&req.question_text) {
      return response;
   }

   let core_req = QuestionTextCoreRequest {
      question_text: req.question_text,
   };
   match state
      .core_service_client
      .update_question(user.user_id, question_id, &core_req)
      .await
   {
      Ok(()) => message_response("質問を更新しました"),
      Err(e) => service_error_response(
         &format!("質問更新(question_id={question_id})"),
         "質問の更新に失敗しました",
         e,
      ),
   }
}

/// DELETE /api/v1/questions/{id}
pub async fn delete_question(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let question_id = match parse_question_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };

   match state
      .core_service_client
      .delete_question(user.user_id, question_id)
      .await
   {
      Ok(()) => message_response("質問を削除しました"),
      Err(e) => service_error_response(
         &format!("質問削除(question_id={question_id})"),
         "質問の削除に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/sales/questions/{id}/response
pub async fn respond_to_question(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
   payload: Result<Json<RespondQuestionRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let question_id = match parse_question_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(response) = check_text(
      &req.response_text,
      ("回答が必要です", "P003V005"),
      ("回答文が長すぎます（最大2000文字）", "P003V006"),
   ) {
      return response;
   }

   let core_req = RespondQuestionCoreRequest {
      response_text: req.response_text,
   };
   match state
      .core_service_client
      .respond_to_question(user.user_id, question_id, &core_req)
      .await
   {
      Ok(()) => message_response("質問に回答しました"),
      Err(e) => service_error_response(
         &format!("質問回答(question_id={question_id})"),
         "質問への回答に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/questions/pending
pub async fn get_pending_questions(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Query(query): Query<PageRequestQuery>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let pagination = Pagination::standard(query.page.as_deref(), query.limit.as_deref());

   match state
      .core_service_client
      .get_pending_questions(user.user_id, page_query(pagination))
      .await
   {
      Ok(core_response) => page_response(core_response.data, pagination),
      Err(e) => service_error_response(
         &format!("未回答質問一覧取得(user_id={})", user.user_id),
         "未回答質問一覧の取得に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/sales/questions/{id}/assign
pub async fn assign_question_to_sales(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
   payload: Result<Json<AssignQuestionRequest>, JsonRejection>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let question_id = match parse_question_id(&id) {
      Ok(id) => id,
      Err(response) => return response,
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   let Ok(sales_user_id) = Uuid::parse_str(req.sales_user_id.trim()) else {
      return code_error("無効なユーザーIDです", "P001V003");
   };

   let core_req = AssignQuestionCoreRequest { sales_user_id };
   match state
      .core_service_client
      .assign_question_to_sales(user.user_id, question_id, &core_req)
      .await
   {
      Ok(()) => message_response("質問を割り当てました"),
      Err(e) => service_error_response(
         &format!("質問割り当て(question_id={question_id}, sales_user_id={sales_user_id})"),
         "質問の割り当てに失敗しました",
         e,
      ),
   }
}

// --- 統計 ---

/// GET /api/v1/proposals/stats
pub async fn get_proposal_stats(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state.core_service_client.get_proposal_stats(user.user_id).await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("提案統計取得(user_id={})", user.user_id),
         "提案統計の取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/proposals/dashboard
pub async fn get_proposal_dashboard(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state
      .core_service_client
      .get_proposal_dashboard(user.user_id)
      .await
   {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("提案ダッシュボード取得(user_id={})", user.user_id),
         "ダッシュボードデータの取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/proposals/engineers/{engineer_id}/active
pub async fn get_active_proposals_by_engineer(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Path(engineer_id): Path<String>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let Ok(engineer_id) = Uuid::parse_str(engineer_id.trim()) else {
      return bad_request_response("無効なエンジニアIDです");
   };

   match state
      .core_service_client
      .get_active_proposals_by_engineer(user.user_id, engineer_id)
      .await
   {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         &format!("エンジニア別アクティブ提案取得(engineer_id={engineer_id})"),
         "アクティブな提案の取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/proposals/parallel
pub async fn get_parallel_proposals(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state
      .core_service_client
      .get_parallel_proposals(user.user_id)
      .await
   {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         &format!("並行提案取得(user_id={})", user.user_id),
         "並行提案の取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/proposals/statistics
///
/// `start_date` / `end_date` は RFC3339。開始が終了より後なら 400。
pub async fn get_proposal_statistics(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Query(query): Query<StatisticsRequestQuery>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let (Ok(start_date), Ok(end_date)) = (
      parse_rfc3339(query.start_date.as_deref()),
      parse_rfc3339(query.end_date.as_deref()),
   ) else {
      return code_error("無効な期間指定です", "P001V005");
   };
   if matches!((start_date, end_date), (Some(start), Some(end)) if start > end) {
      return code_error("無効な期間指定です", "P001V005");
   }

   let core_query = ProposalStatisticsQuery {
      start_date,
      end_date,
   };
   match state
      .core_service_client
      .get_proposal_statistics(user.user_id, &core_query)
      .await
   {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("提案統計取得(user_id={})", user.user_id),
         "提案統計の取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/proposals/deadlines/upcoming
pub async fn get_upcoming_deadlines(
   State(state): State<Arc<ProposalState>>,
   current_user: Option<Extension<CurrentUser>>,
   Query(query): Query<DeadlineRequestQuery>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   let days = parse_deadline_days(query.days.as_deref());

   match state
      .core_service_client
      .get_upcoming_deadlines(user.user_id, days)
      .await
   {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         &format!("期限間近の提案取得(days={days})"),
         "期限が近い提案の取得に失敗しました",
         e,
      ),
   }
}

// --- 準備中のエンドポイント ---

const PROPOSAL_MUTATION_NOT_IMPLEMENTED: &str = "提案の作成・更新・削除は準備中です";

/// POST /api/v1/sales/proposals
pub async fn create_proposal(current_user: Option<Extension<CurrentUser>>) -> Response {
   if current_user.is_none() {
      return unauthorized_response();
   }
   not_implemented_response(PROPOSAL_MUTATION_NOT_IMPLEMENTED)
}

/// PUT /api/v1/sales/proposals/{id}
pub async fn update_proposal(
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
) -> Response {
   if current_user.is_none() {
      return unauthorized_response();
   }
   if let Err(response) = parse_proposal_id(&id) {
      return response;
   }
   not_implemented_response(PROPOSAL_MUTATION_NOT_IMPLEMENTED)
}

/// DELETE /api/v1/sales/proposals/{id}
pub async fn delete_proposal(
   current_user: Option<Extension<CurrentUser>>,
   Path(id): Path<String>,
) -> Response {
   if current_user.is_none() {
      return unauthorized_response();
   }
   if let Err(response) = parse_proposal_id(&id) {
      return response;
   }
   not_implemented_response(PROPOSAL_MUTATION_NOT_IMPLEMENTED)
}
