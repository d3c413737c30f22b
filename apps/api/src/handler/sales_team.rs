//! # 営業チームハンドラ
//!
//! 営業チームメンバーの管理と、メンバーのロールに応じた権限の参照。
//! `/api/v1/sales/team` 配下に登録し、管理画面向けに
//! `/api/v1/admin/sales/team` 配下にも同じハンドラを登録する。
//!
//! 操作の実行者（`created_by` / `deleted_by` など）はリクエストボディで受け取り、
//! そのまま Core Service に渡す。

use std::sync::Arc;

use axum::{
   Extension,
   Json,
   extract::{Path, Query, State, rejection::JsonRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use kanri_shared::{ListResponse, PageResponse};
use serde::{Deserialize, Serialize};

use crate::{
   client::{
      CoreServiceError,
      CoreServiceSalesTeamClient,
      core_service::{
         CreateSalesTeamMemberRequest,
         SalesTeamMemberDto,
         SalesTeamMemberFilter,
         UpdateSalesTeamMemberRequest,
      },
   },
   error::{
      INVALID_REQUEST_MESSAGE,
      bad_request_response,
      conflict_response,
      internal_error_response,
      message_response,
      not_found_response,
      not_implemented_response,
      service_error_response,
      unauthorized_response,
   },
   middleware::CurrentUser,
   params::{Pagination, non_blank},
};

const MEMBER_ID_REQUIRED: &str = "メンバーIDが必要です";
const USER_ID_REQUIRED: &str = "ユーザーIDが必要です";
const USER_NOT_FOUND: &str = "ユーザーが見つかりません";
const ALREADY_MEMBER: &str = "このユーザーは既に営業チームのメンバーです";
const FEATURE_NOT_IMPLEMENTED: &str = "この機能は現在準備中です";

/// 営業チームに属さないユーザーの権限
const NON_MEMBER_PERMISSIONS: &[&str] = &["view_proposals", "create_questions"];

const MANAGER_PERMISSIONS: &[&str] = &[
   "view_all_proposals",
   "respond_to_questions",
   "assign_questions",
   "view_statistics",
   "manage_team_members",
   "create_proposals",
   "update_proposals",
   "delete_proposals",
];

const MEMBER_PERMISSIONS: &[&str] = &[
   "view_assigned_proposals",
   "respond_to_questions",
   "view_basic_statistics",
   "create_proposals",
   "update_own_proposals",
];

const DEFAULT_PERMISSIONS: &[&str] = &["view_proposals"];

/// 営業チーム API の共有状態
pub struct SalesTeamState {
   pub core_service_client: Arc<dyn CoreServiceSalesTeamClient>,
}

// --- リクエスト型 ---

/// メンバー一覧のクエリ
#[derive(Debug, Default, Deserialize)]
pub struct MemberListQuery {
   pub team_role: Option<String>,
   pub is_active: Option<String>,
   pub page:      Option<String>,
   pub limit:     Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageRequestQuery {
   pub page:  Option<String>,
   pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMemberRequest {
   pub deleted_by: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivateMemberRequest {
   pub activated_by: String,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateMemberRequest {
   pub deactivated_by: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
   pub team_role:  String,
   pub updated_by: String,
}

// --- レスポンス型 ---

#[derive(Debug, Serialize)]
pub struct MemberRoleUpdatedResponse {
   pub message: &'static str,
   pub member:  SalesTeamMemberDto,
}

/// ユーザーの権限情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPermissionsResponse {
   pub permissions:     Vec<String>,
   pub team_role:       String,
   pub is_sales_member: bool,
   pub is_active:       bool,
}

impl UserPermissionsResponse {
   fn non_member() -> Self {
      Self {
         permissions:     to_strings(NON_MEMBER_PERMISSIONS),
         team_role:       String::new(),
         is_sales_member: false,
         is_active:       false,
      }
   }

   fn for_member(member: &SalesTeamMemberDto) -> Self {
      Self {
         permissions:     to_strings(permissions_for_role(&member.team_role)),
         team_role:       member.team_role.clone(),
         is_sales_member: true,
         is_active:       member.is_active,
      }
   }
}

/// チームロールごとの権限
pub fn permissions_for_role(team_role: &str) -> &'static [&'static str] {
   match team_role {
      "manager" => MANAGER_PERMISSIONS,
      "member" => MEMBER_PERMISSIONS,
      _ => DEFAULT_PERMISSIONS,
   }
}

fn to_strings(values: &[&str]) -> Vec<String> {
   values.iter().map(|value| (*value).to_string()).collect()
}

// --- メンバー管理 ---

/// POST /api/v1/sales/team/members
///
/// 既知の 2 つのエラー文言だけを 404 / 409 にし、それ以外はすべて 500 にする。
pub async fn create_member(
   State(state): State<Arc<SalesTeamState>>,
   payload: Result<Json<CreateSalesTeamMemberRequest>, JsonRejection>,
) -> Response {
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if [&req.user_id, &req.team_role, &req.created_by]
      .iter()
      .any(|value| value.trim().is_empty())
   {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   }

   match state.core_service_client.create_member(&req).await {
      Ok(core_response) => (StatusCode::CREATED, Json(core_response.data)).into_response(),
      Err(CoreServiceError::NotFound(message)) if message == USER_NOT_FOUND => {
         not_found_response(&message)
      }
      Err(CoreServiceError::Conflict(message)) if message == ALREADY_MEMBER => {
         conflict_response(&message)
      }
      Err(e) => {
         tracing::error!(
            error.category = "external_service",
            error.kind = "sales_team",
            "営業チームメンバー作成(user_id={})で内部エラー: {}",
            req.user_id,
            e
         );
         internal_error_response("営業チームメンバーの作成に失敗しました")
      }
   }
}

/// GET /api/v1/sales/team/members/{id}
pub async fn get_member(
   State(state): State<Arc<SalesTeamState>>,
   Path(member_id): Path<String>,
) -> Response {
   let Some(member_id) = non_blank(Some(member_id.as_str())) else {
      return bad_request_response(MEMBER_ID_REQUIRED);
   };

   match state.core_service_client.get_member(member_id).await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("営業チームメンバー取得(member_id={member_id})"),
         "営業チームメンバーの取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/team/users/{user_id}/member
pub async fn get_member_by_user_id(
   State(state): State<Arc<SalesTeamState>>,
   Path(user_id): Path<String>,
) -> Response {
   let Some(user_id) = non_blank(Some(user_id.as_str())) else {
      return bad_request_response(USER_ID_REQUIRED);
   };

   match state.core_service_client.get_member_by_user_id(user_id).await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("営業チームメンバー取得(user_id={user_id})"),
         "営業チームメンバーの取得に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/sales/team/members/{id}
pub async fn update_member(
   State(state): State<Arc<SalesTeamState>>,
   Path(member_id): Path<String>,
   payload: Result<Json<UpdateSalesTeamMemberRequest>, JsonRejection>,
) -> Response {
   let Some(member_id) = non_blank(Some(member_id.as_str())) else {
      return bad_request_response(MEMBER_ID_REQUIRED);
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };

   match state.core_service_client.update_member(member_id, &req).await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response(
         &format!("営業チームメンバー更新(member_id={member_id})"),
         "営業チームメンバーの更新に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/sales/team/members/{id}/role
pub async fn update_member_role(
   State(state): State<Arc<SalesTeamState>>,
   Path(member_id): Path<String>,
   payload: Result<Json<UpdateMemberRoleRequest>, JsonRejection>,
) -> Response {
   let Some(member_id) = non_blank(Some(member_id.as_str())) else {
      return bad_request_response(MEMBER_ID_REQUIRED);
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if req.team_role.trim().is_empty() || req.updated_by.trim().is_empty() {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   }

   let core_req = UpdateSalesTeamMemberRequest {
      team_role:   Some(req.team_role),
      permissions: None,
      updated_by:  req.updated_by,
   };
   match state.core_service_client.update_member(member_id, &core_req).await {
      Ok(core_response) => Json(MemberRoleUpdatedResponse {
         message: "メンバーロールを更新しました",
         member:  core_response.data,
      })
      .into_response(),
      Err(e) => service_error_response(
         &format!("メンバーロール更新(member_id={member_id})"),
         "メンバーロールの更新に失敗しました",
         e,
      ),
   }
}

/// DELETE /api/v1/sales/team/members/{id}
pub async fn delete_member(
   State(state): State<Arc<SalesTeamState>>,
   Path(member_id): Path<String>,
   payload: Result<Json<DeleteMemberRequest>, JsonRejection>,
) -> Response {
   let Some(member_id) = non_blank(Some(member_id.as_str())) else {
      return bad_request_response(MEMBER_ID_REQUIRED);
   };
   let Some(deleted_by) = actor(payload.ok().map(|Json(req)| req.deleted_by)) else {
      return bad_request_response("削除者情報が必要です");
   };

   match state
      .core_service_client
      .delete_member(member_id, &deleted_by)
      .await
   {
      Ok(()) => message_response("営業チームメンバーを削除しました"),
      Err(e) => service_error_response(
         &format!("営業チームメンバー削除(member_id={member_id})"),
         "営業チームメンバーの削除に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/sales/team/members/{id}/activate
pub async fn activate_member(
   State(state): State<Arc<SalesTeamState>>,
   Path(member_id): Path<String>,
   payload: Result<Json<ActivateMemberRequest>, JsonRejection>,
) -> Response {
   let Some(member_id) = non_blank(Some(member_id.as_str())) else {
      return bad_request_response(MEMBER_ID_REQUIRED);
   };
   let Some(activated_by) = actor(payload.ok().map(|Json(req)| req.activated_by)) else {
      return bad_request_response("実行者情報が必要です");
   };

   match state
      .core_service_client
      .activate_member(member_id, &activated_by)
      .await
   {
      Ok(()) => message_response("営業チームメンバーをアクティブ化しました"),
      Err(e) => service_error_response(
         &format!("営業チームメンバーアクティブ化(member_id={member_id})"),
         "営業チームメンバーのアクティブ化に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/sales/team/members/{id}/deactivate
pub async fn deactivate_member(
   State(state): State<Arc<SalesTeamState>>,
   Path(member_id): Path<String>,
   payload: Result<Json<DeactivateMemberRequest>, JsonRejection>,
) -> Response {
   let Some(member_id) = non_blank(Some(member_id.as_str())) else {
      return bad_request_response(MEMBER_ID_REQUIRED);
   };
   let Some(deactivated_by) = actor(payload.ok().map(|Json(req)| req.deactivated_by)) else {
      return bad_request_response("実行者情報が必要です");
   };

   match state
      .core_service_client
      .deactivate_member(member_id, &deactivated_by)
      .await
   {
      Ok(()) => message_response("営業チームメンバーを非アクティブ化しました"),
      Err(e) => service_error_response(
         &format!("営業チームメンバー非アクティブ化(member_id={member_id})"),
         "営業チームメンバーの非アクティブ化に失敗しました",
         e,
      ),
   }
}

/// 実行者 ID（空白のみは未指定扱い）
fn actor(raw: Option<String>) -> Option<String> {
   raw.filter(|value| !value.trim().is_empty())
}

// --- 一覧・統計 ---

/// GET /api/v1/sales/team/members
///
/// `is_active` は `true` / `false` のみ解釈し、それ以外は指定なしとして扱う。
pub async fn get_member_list(
   State(state): State<Arc<SalesTeamState>>,
   Query(query): Query<MemberListQuery>,
) -> Response {
   let pagination = Pagination::standard(query.page.as_deref(), query.limit.as_deref());
   let filter = SalesTeamMemberFilter {
      team_role: non_blank(query.team_role.as_deref()).map(str::to_string),
      is_active: non_blank(query.is_active.as_deref()).and_then(|value| value.parse().ok()),
      page:      pagination.page,
      limit:     pagination.limit,
   };

   match state.core_service_client.get_member_list(&filter).await {
      Ok(core_response) => {
         let list = core_response.data;
         Json(PageResponse::new(
            list.items,
            list.total,
            pagination.page,
            pagination.limit,
         ))
         .into_response()
      }
      Err(e) => service_error_response(
         "営業チームメンバー一覧取得",
         "営業チームメンバー一覧の取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/team/members/active
pub async fn get_active_members(State(state): State<Arc<SalesTeamState>>) -> Response {
   match state.core_service_client.get_active_members().await {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         "アクティブメンバー取得",
         "アクティブメンバーの取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/team/members/roles/{role}
pub async fn get_members_by_role(
   State(state): State<Arc<SalesTeamState>>,
   Path(team_role): Path<String>,
) -> Response {
   let Some(team_role) = non_blank(Some(team_role.as_str())) else {
      return bad_request_response("ロールが必要です");
   };

   match state.core_service_client.get_members_by_role(team_role).await {
      Ok(core_response) => Json(ListResponse::from_items(core_response.data)).into_response(),
      Err(e) => service_error_response(
         &format!("ロール別メンバー取得(team_role={team_role})"),
         "ロール別メンバーの取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/sales/team/statistics
pub async fn get_team_statistics(State(state): State<Arc<SalesTeamState>>) -> Response {
   match state.core_service_client.get_team_statistics().await {
      Ok(core_response) => Json(core_response.data).into_response(),
      Err(e) => service_error_response("営業チーム統計取得", "統計情報の取得に失敗しました", e),
   }
}

// --- 権限 ---

/// GET /api/v1/sales/team/permissions/users/{user_id}
pub async fn get_user_permissions(
   State(state): State<Arc<SalesTeamState>>,
   Path(user_id): Path<String>,
) -> Response {
   let Some(user_id) = non_blank(Some(user_id.as_str())) else {
      return bad_request_response(USER_ID_REQUIRED);
   };
   permissions_response(&state, user_id).await
}

/// GET /api/v1/sales/team/permissions
///
/// ログイン中のユーザー自身の権限を返す。
pub async fn get_my_permissions(
   State(state): State<Arc<SalesTeamState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };
   permissions_response(&state, &user.user_id.to_string()).await
}

/// メンバーでなければ（`NotFound`）基本権限のみを返す
async fn permissions_response(state: &SalesTeamState, user_id: &str) -> Response {
   match state.core_service_client.get_member_by_user_id(user_id).await {
      Ok(core_response) => Json(UserPermissionsResponse::for_member(&core_response.data)).into_response(),
      Err(CoreServiceError::NotFound(_)) => Json(UserPermissionsResponse::non_member()).into_response(),
      Err(e) => service_error_response(
         &format!("権限情報取得(user_id={user_id})"),
         "権限情報の取得に失敗しました",
         e,
      ),
   }
}

// --- アクセス可能なデータ（データなし） ---

/// GET /api/v1/sales/team/accessible/{proposals,interviews,extensions}
///
/// 対象データの連携前のため常に空の一覧を返す（有効な空状態）。
pub async fn get_accessible_resources(Query(query): Query<PageRequestQuery>) -> impl IntoResponse {
   let pagination = Pagination::standard(query.page.as_deref(), query.limit.as_deref());
   Json(PageResponse::<serde_json::Value>::empty(
      pagination.page,
      pagination.limit,
   ))
}

// --- 準備中のエンドポイント ---

/// 権限付与・剥奪・チェック、メンバー別統計、チーム設定
pub async fn sales_team_not_implemented() -> impl IntoResponse {
   not_implemented_response(FEATURE_NOT_IMPLEMENTED)
}
