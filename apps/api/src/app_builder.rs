//! # アプリケーション構築
//!
//! State の初期化とルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## 認可
//!
//! | ルートグループ | 要求 |
//! |----------------|------|
//! | `/api/v1/auth/*`, `/health` | なし（`me` はハンドラで 401） |
//! | 経費 PDF・提案 | ハンドラで 401 |
//! | POC 同期・営業チーム・ユーザー参照 | [`require_authenticated`] |
//! | `/api/v1/admin/accounting/freee/*` | `accounting` ロール |
//! | その他の `/api/v1/admin/*`・ユーザー管理 | `admin` ロール |

use std::sync::Arc;

use axum::{
   Router,
   middleware::{from_fn, from_fn_with_state},
   routing::{delete, get, post, put},
};
use kanri_infra::{LoginAttemptStore, SessionManager};
use kanri_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
   request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
   trace::TraceLayer,
};

use crate::{
   client::CoreServiceClient,
   config::ApiConfig,
   handler::{
      ExpensePdfState,
      FreeeState,
      PocSyncState,
      ProposalState,
      ReadinessState,
      ReminderState,
      SalesTeamState,
      UserState,
      expense_pdf,
      freee,
      health_check,
      poc_sync,
      proposal,
      readiness_check,
      reminder,
      sales_team,
      user,
   },
   middleware::{
      ADMIN_ROLE,
      AuthnState,
      AuthzState,
      authenticate_session,
      no_store,
      require_authenticated,
      require_role,
      store_request_id,
   },
};

/// 経理担当ロール
pub const ACCOUNTING_ROLE: &str = "accounting";

/// ルーター構築に必要な依存
///
/// インフラ初期化済みのものを `main.rs` またはテストから渡す。
pub struct AppDependencies<C> {
   pub core_service_client: Arc<C>,
   pub session_manager:     Arc<dyn SessionManager>,
   pub login_attempt_store: Arc<dyn LoginAttemptStore>,
   /// `None` の場合 `/health/ready` を登録しない
   pub readiness_state:     Option<Arc<ReadinessState>>,
}

/// State の組み立てとルーター定義を行う
///
/// Core Service クライアントは具象型で受け取り、各 State 注入時に必要な
/// サブトレイトのトレイトオブジェクトへ coerce する。
pub fn build_app<C>(config: &ApiConfig, deps: AppDependencies<C>) -> Router
where
   C: CoreServiceClient + 'static,
{
   let AppDependencies {
      core_service_client,
      session_manager,
      login_attempt_store,
      readiness_state,
   } = deps;

   let expense_pdf_state = Arc::new(ExpensePdfState {
      core_service_client: core_service_client.clone(),
   });
   let freee_state = Arc::new(FreeeState {
      core_service_client: core_service_client.clone(),
   });
   let poc_sync_state = Arc::new(PocSyncState {
      core_service_client: core_service_client.clone(),
   });
   let proposal_state = Arc::new(ProposalState {
      core_service_client: core_service_client.clone(),
   });
   let reminder_state = Arc::new(ReminderState {
      core_service_client: core_service_client.clone(),
   });
   let sales_team_state = Arc::new(SalesTeamState {
      core_service_client: core_service_client.clone(),
   });
   let user_state = Arc::new(UserState {
      core_service_client,
      session_manager: session_manager.clone(),
      login_attempt_store,
      max_login_attempts: config.login_lock.max_attempts,
      secure_cookie: config.secure_cookie,
   });

   let authn_state = AuthnState { session_manager };
   let admin_authz = AuthzState::new(ADMIN_ROLE);
   let accounting_authz = AuthzState::new(ACCOUNTING_ROLE);

   let mut app = Router::new().route("/health", get(health_check));
   if let Some(readiness_state) = readiness_state {
      app = app.merge(
         Router::new()
            .route("/health/ready", get(readiness_check))
            .with_state(readiness_state),
      );
   }

   app
      // 認証 API
      .merge(
         Router::new()
            .route("/api/v1/auth/login", post(user::login))
            .route("/api/v1/auth/logout", post(user::logout))
            .route("/api/v1/auth/me", get(user::me))
            .with_state(user_state.clone()),
      )
      // ユーザー API（参照は認証済みなら可）
      .merge(
         Router::new()
            .route("/api/v1/users/by-email", get(user::get_user_by_email))
            .route("/api/v1/users/{id}", get(user::get_user))
            .route_layer(from_fn(require_authenticated))
            .with_state(user_state.clone()),
      )
      .merge(
         Router::new()
            .route("/api/v1/users", post(user::create_user))
            .route("/api/v1/users/{id}", put(user::update_user))
            .route("/api/v1/users/{id}/unlock", post(user::unlock_account))
            .route_layer(from_fn_with_state(admin_authz.clone(), require_role))
            .with_state(user_state),
      )
      // 経費 PDF API
      .merge(
         Router::new()
            .route(
               "/api/v1/expenses/pdf",
               get(expense_pdf::generate_expense_list_pdf),
            )
            .route(
               "/api/v1/expenses/{id}/pdf",
               get(expense_pdf::generate_expense_pdf),
            )
            .with_state(expense_pdf_state),
      )
      .merge(proposal_routes().with_state(proposal_state))
      // POC 同期 API
      .merge(
         Router::new()
            .nest("/api/v1/sales/poc-sync", poc_sync_routes())
            .route_layer(from_fn(require_authenticated))
            .with_state(poc_sync_state.clone()),
      )
      .merge(
         Router::new()
            .route(
               "/api/v1/admin/sales/batch/poc-sync/scheduled",
               post(poc_sync::run_scheduled_sync),
            )
            .route(
               "/api/v1/admin/sales/settings/poc-sync",
               get(poc_sync::get_sync_settings).put(poc_sync::update_sync_settings),
            )
            .route_layer(from_fn_with_state(admin_authz.clone(), require_role))
            .with_state(poc_sync_state),
      )
      // 営業チーム API（一般向けと管理画面向けに同じハンドラを登録）
      .merge(
         Router::new()
            .nest("/api/v1/sales/team", sales_team_routes())
            .route_layer(from_fn(require_authenticated))
            .with_state(sales_team_state.clone()),
      )
      .merge(
         Router::new()
            .nest("/api/v1/admin/sales/team", sales_team_routes())
            .route(
               "/api/v1/admin/sales/settings/team",
               get(sales_team::sales_team_not_implemented)
                  .put(sales_team::sales_team_not_implemented),
            )
            .route_layer(from_fn_with_state(admin_authz.clone(), require_role))
            .with_state(sales_team_state),
      )
      // 週報リマインド API
      .merge(
         Router::new()
            .nest("/api/v1/admin", reminder_routes())
            .route_layer(from_fn_with_state(admin_authz, require_role))
            .with_state(reminder_state),
      )
      // freee 連携 API
      .merge(
         Router::new()
            .nest("/api/v1/admin/accounting/freee", freee_routes())
            .route_layer(from_fn_with_state(accounting_authz, require_role))
            .with_state(freee_state),
      )
      // セッション解決は認可（route_layer）より先に走る
      .layer(from_fn_with_state(authn_state, authenticate_session))
      .layer(from_fn(no_store))
      // レイヤー順序: 下に書いたものが外側
      // 1. SetRequestIdLayer（最外）: UUID v7 を採番（クライアント提供値があればそれを使う）
      // 2. TraceLayer: request_id を含むスパンを作る
      // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
      // 4. store_request_id: Core Service 呼び出しへの伝播用に task-local に保存
      .layer(from_fn(store_request_id))
      .layer(PropagateRequestIdLayer::x_request_id())
      .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
      .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// 提案・質問 API
///
/// 一覧と詳細は `/api/v1/proposals`・`/api/v1/sales/engineer-proposals`・
/// `/api/v1/sales/proposals` の 3 系統に同じハンドラを登録する。
fn proposal_routes() -> Router<Arc<ProposalState>> {
   Router::new()
      .route("/api/v1/proposals", get(proposal::get_proposals))
      .route("/api/v1/proposals/stats", get(proposal::get_proposal_stats))
      .route(
         "/api/v1/proposals/dashboard",
         get(proposal::get_proposal_dashboard),
      )
      .route("/api/v1/proposals/{id}", get(proposal::get_proposal_detail))
      .route(
         "/api/v1/proposals/{id}/status",
         put(proposal::update_proposal_status),
      )
      .route(
         "/api/v1/proposals/{id}/questions",
         get(proposal::get_questions).post(proposal::create_question),
      )
      .route(
         "/api/v1/questions/{id}",
         put(proposal::update_question).delete(proposal::delete_question),
      )
      .route(
         "/api/v1/sales/engineer-proposals",
         get(proposal::get_proposals),
      )
      .route(
         "/api/v1/sales/engineer-proposals/{id}",
         get(proposal::get_proposal_detail),
      )
      .route(
         "/api/v1/sales/engineer-proposals/{id}/questions",
         get(proposal::get_questions),
      )
      .route(
         "/api/v1/sales/proposals",
         get(proposal::get_proposals).post(proposal::create_proposal),
      )
      .route(
         "/api/v1/sales/proposals/parallel",
         get(proposal::get_parallel_proposals),
      )
      .route(
         "/api/v1/sales/proposals/statistics",
         get(proposal::get_proposal_statistics),
      )
      .route(
         "/api/v1/sales/proposals/deadlines/upcoming",
         get(proposal::get_upcoming_deadlines),
      )
      .route(
         "/api/v1/sales/proposals/engineers/{engineer_id}/active",
         get(proposal::get_active_proposals_by_engineer),
      )
      .route(
         "/api/v1/sales/proposals/{id}",
         get(proposal::get_proposal_detail)
            .put(proposal::update_proposal)
            .delete(proposal::delete_proposal),
      )
      .route(
         "/api/v1/sales/proposals/{id}/status",
         put(proposal::update_proposal_status),
      )
      .route(
         "/api/v1/sales/questions/pending",
         get(proposal::get_pending_questions),
      )
      .route(
         "/api/v1/sales/questions/{id}/response",
         put(proposal::respond_to_question),
      )
      .route(
         "/api/v1/sales/questions/{id}/assign",
         put(proposal::assign_question_to_sales),
      )
}

/// POC 同期 API（`/api/v1/sales/poc-sync` 配下）
fn poc_sync_routes() -> Router<Arc<PocSyncState>> {
   Router::new()
      .route("/sync/all", post(poc_sync::sync_all_projects))
      .route("/sync/projects/{id}", post(poc_sync::sync_project_by_id))
      .route("/sync/projects/{id}/force", post(poc_sync::force_sync))
      .route("/sync/scheduled", post(poc_sync::run_scheduled_sync))
      .route("/status", get(poc_sync::get_sync_status))
      .route("/unsynced", get(poc_sync::get_unsynced_projects))
      .route("/history", get(poc_sync::get_sync_history))
      .route("/projects", post(poc_sync::create_project_from_poc))
      .route("/projects/{id}", put(poc_sync::update_project_from_poc))
      .route(
         "/settings",
         get(poc_sync::get_sync_settings).put(poc_sync::update_sync_settings),
      )
}

/// 営業チーム API（`/api/v1/sales/team`・`/api/v1/admin/sales/team` 配下）
fn sales_team_routes() -> Router<Arc<SalesTeamState>> {
   use sales_team::sales_team_not_implemented as not_implemented;

   Router::new()
      .route(
         "/members",
         get(sales_team::get_member_list).post(sales_team::create_member),
      )
      .route("/members/active", get(sales_team::get_active_members))
      .route(
         "/members/roles/{role}",
         get(sales_team::get_members_by_role),
      )
      .route(
         "/members/{id}",
         get(sales_team::get_member)
            .put(sales_team::update_member)
            .delete(sales_team::delete_member),
      )
      .route("/members/{id}/role", put(sales_team::update_member_role))
      .route("/members/{id}/activate", post(sales_team::activate_member))
      .route(
         "/members/{id}/deactivate",
         post(sales_team::deactivate_member),
      )
      .route("/members/{id}/statistics", get(not_implemented))
      .route(
         "/users/{user_id}/member",
         get(sales_team::get_member_by_user_id),
      )
      .route("/statistics", get(sales_team::get_team_statistics))
      .route(
         "/permissions",
         get(sales_team::get_my_permissions).post(not_implemented),
      )
      .route("/permissions/{permission_id}", delete(not_implemented))
      .route(
         "/permissions/users/{user_id}",
         get(sales_team::get_user_permissions),
      )
      .route("/check-permission", post(not_implemented))
      .route("/check-access", post(not_implemented))
      .route("/settings", get(not_implemented).put(not_implemented))
      .route(
         "/accessible/proposals",
         get(sales_team::get_accessible_resources),
      )
      .route(
         "/accessible/interviews",
         get(sales_team::get_accessible_resources),
      )
      .route(
         "/accessible/extensions",
         get(sales_team::get_accessible_resources),
      )
}

/// 週報リマインド API（`/api/v1/admin` 配下）
fn reminder_routes() -> Router<Arc<ReminderState>> {
   use reminder::approval_reminder_not_implemented as not_implemented;

   Router::new()
      .route(
         "/weekly-reports/reminder-settings",
         get(reminder::get_reminder_settings).put(reminder::update_reminder_settings),
      )
      .route(
         "/weekly-reports/reminders/today",
         get(reminder::get_todays_reminders),
      )
      .route(
         "/weekly-reports/reminders/send",
         post(reminder::send_reminders),
      )
      .route(
         "/weekly-reports/reminders/overdue",
         post(reminder::send_overdue_reminders),
      )
      .route(
         "/weekly-reports/reminders/escalations",
         post(reminder::process_escalations),
      )
      .route(
         "/approval-reminder/config",
         get(not_implemented).put(not_implemented),
      )
      .route("/approval-reminder/execute", post(not_implemented))
      .route("/approval-reminder/scheduler/start", post(not_implemented))
      .route("/approval-reminder/scheduler/stop", post(not_implemented))
}

/// freee 連携 API（`/api/v1/admin/accounting/freee` 配下）
fn freee_routes() -> Router<Arc<FreeeState>> {
   Router::new()
      .route("/status", get(freee::get_connection_status))
      .route("/oauth/initiate", post(freee::initiate_oauth))
      .route("/oauth/complete", post(freee::complete_oauth))
      .route("/test", post(freee::test_connection))
      .route("/companies", get(freee::get_companies))
      .route("/companies/select", post(freee::select_company))
      .route("/disconnect", delete(freee::disconnect))
      .route("/sync/partners", post(freee::sync_partners))
      .route("/sync/invoices", post(freee::sync_invoices))
      .route("/sync/history", get(freee::get_sync_history))
      .route("/sync/summary", get(freee::get_sync_summary))
}
