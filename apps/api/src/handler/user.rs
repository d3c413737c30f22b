//! # ユーザー・認証ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/v1/auth/login` - ログイン（セッション Cookie 発行）
//! - `POST /api/v1/auth/logout` - ログアウト
//! - `GET /api/v1/auth/me` - ログイン中のユーザー情報
//! - `POST /api/v1/users` - ユーザー作成（admin）
//! - `GET /api/v1/users/by-email?email=` - メールアドレス検索
//! - `GET /api/v1/users/{id}` - ユーザー取得
//! - `PUT /api/v1/users/{id}` - ユーザー更新（admin）
//! - `POST /api/v1/users/{id}/unlock` - アカウントロック解除（admin）
//!
//! ## ログイン試行制限
//!
//! 認証情報を検証する前にメールアドレス単位の試行回数を予約し、予約後の回数が上限を超えた
//! 試行は検証せずに 429 を返す。成功すると回数はリセットされ、Core Service の障害で
//! 認証結果が出なかった試行は予約を取り消す。ロック解除は時間経過か `unlock_account` で行う。

use std::sync::Arc;

use axum::{
   Extension,
   Json,
   extract::{Path, Query, State, rejection::JsonRejection},
   http::StatusCode,
   response::{IntoResponse, Response},
};
use axum_extra::extract::{
   CookieJar,
   cookie::{Cookie, SameSite},
};
use kanri_infra::{
   InfraError,
   LoginAttemptStore,
   SessionData,
   SessionManager,
   session::SESSION_TTL_SECONDS,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
   client::{
      CoreServiceError,
      CoreServiceUserClient,
      core_service::{
         CreateUserCoreRequest,
         UpdateUserCoreRequest,
         UserDto,
         VerifyCredentialsCoreRequest,
      },
   },
   error::{
      INVALID_REQUEST_MESSAGE,
      bad_request_response,
      error_response,
      error_with_code_response,
      internal_error_response,
      message_response,
      service_error_response,
      unauthorized_response,
      validation_errors_response,
   },
   middleware::{CurrentUser, SESSION_COOKIE_NAME},
   params::non_blank,
};

/// ログイン失敗時のメッセージ
///
/// メールアドレスの存在有無を推測されないよう、失敗理由は区別しない。
pub const LOGIN_FAILED_MESSAGE: &str = "メールアドレスまたはパスワードが正しくありません";

/// ロック中のメッセージ
pub const LOGIN_LOCKED_MESSAGE: &str =
   "ログイン試行回数の上限に達しました。しばらくしてから再度お試しください";

/// ロック中のエラーコード
pub const LOGIN_LOCKED_CODE: &str = "LOGIN_LOCKED";

const INVALID_USER_ID_MESSAGE: &str = "無効なユーザーIDです";
const LOGIN_ERROR_MESSAGE: &str = "ログイン処理に失敗しました";

/// ユーザー API の共有状態
pub struct UserState {
   pub core_service_client: Arc<dyn CoreServiceUserClient>,
   pub session_manager:     Arc<dyn SessionManager>,
   pub login_attempt_store: Arc<dyn LoginAttemptStore>,
   /// この回数以上失敗したアカウントはロックする
   pub max_login_attempts:  u32,
   /// Cookie に `Secure` 属性を付けるか
   pub secure_cookie:       bool,
}

// --- リクエスト型 ---

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
   #[serde(default)]
   #[validate(email(message = "メールアドレスの形式が不正です"))]
   pub email:    String,
   #[serde(default)]
   #[validate(length(min = 1, message = "パスワードを入力してください"))]
   pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
   #[serde(default)]
   #[validate(email(message = "メールアドレスの形式が不正です"))]
   pub email:           String,
   #[serde(default)]
   #[validate(length(min = 8, message = "パスワードは8文字以上で指定してください"))]
   pub password:        String,
   #[serde(default)]
   #[validate(length(min = 1, message = "名は必須です"))]
   pub first_name:      String,
   #[serde(default)]
   #[validate(length(min = 1, message = "姓は必須です"))]
   pub last_name:       String,
   pub first_name_kana: Option<String>,
   pub last_name_kana:  Option<String>,
   pub phone_number:    Option<String>,
   pub role:            Option<String>,
}

impl From<CreateUserRequest> for CreateUserCoreRequest {
   fn from(req: CreateUserRequest) -> Self {
      Self {
         email:           req.email.trim().to_string(),
         password:        req.password,
         first_name:      req.first_name,
         last_name:       req.last_name,
         first_name_kana: req.first_name_kana,
         last_name_kana:  req.last_name_kana,
         phone_number:    req.phone_number,
         role:            req.role,
      }
   }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
   pub first_name:      Option<String>,
   pub last_name:       Option<String>,
   pub first_name_kana: Option<String>,
   pub last_name_kana:  Option<String>,
   pub phone_number:    Option<String>,
   pub role:            Option<String>,
   pub active:          Option<bool>,
}

impl From<UpdateUserRequest> for UpdateUserCoreRequest {
   fn from(req: UpdateUserRequest) -> Self {
      Self {
         first_name:      req.first_name,
         last_name:       req.last_name,
         first_name_kana: req.first_name_kana,
         last_name_kana:  req.last_name_kana,
         phone_number:    req.phone_number,
         role:            req.role,
         active:          req.active,
      }
   }
}

#[derive(Debug, Deserialize)]
pub struct UserByEmailQuery {
   pub email: Option<String>,
}

// --- レスポンス型 ---

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponseData {
   pub user: UserDto,
}

// --- 認証 ---

/// POST /api/v1/auth/login
///
/// ```json
/// { "email": "user@example.com", "password": "password123" }
/// ```
pub async fn login(
   State(state): State<Arc<UserState>>,
   jar: CookieJar,
   payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(errors) = req.validate() {
      return validation_errors_response(&errors);
   }
   let email = req.email.trim().to_string();

   // 認証の前に試行を予約する。同時のログインも予約順に上限判定される
   let attempt = match state.login_attempt_store.reserve_attempt(&email).await {
      Ok(attempt) => attempt,
      Err(e) => return login_store_error("ログイン試行の予約", &e),
   };
   if attempt > state.max_login_attempts {
      tracing::info!(attempt, "ロック中のアカウントへのログイン試行を拒否しました");
      return error_with_code_response(
         StatusCode::TOO_MANY_REQUESTS,
         LOGIN_LOCKED_MESSAGE,
         LOGIN_LOCKED_CODE,
      );
   }

   let verify_request = VerifyCredentialsCoreRequest {
      email:    email.clone(),
      password: req.password,
   };
   let user = match state
      .core_service_client
      .verify_credentials(&verify_request)
      .await
   {
      Ok(response) => response.into_inner(),
      Err(CoreServiceError::Unauthorized(_)) => {
         tracing::info!(failures = attempt, "ログインに失敗しました");
         return error_response(StatusCode::UNAUTHORIZED, LOGIN_FAILED_MESSAGE);
      }
      Err(e) => {
         // 認証結果が出ていないため失敗回数には含めない
         let released = state.login_attempt_store.release_attempt(&email).await;
         if let Err(release_error) = released {
            tracing::warn!("ログイン試行の予約取り消しに失敗（無視）: {}", release_error);
         }
         return service_error_response("ログイン", LOGIN_ERROR_MESSAGE, e);
      }
   };

   if let Err(e) = state.login_attempt_store.reset(&email).await {
      return login_store_error("ログイン失敗回数のリセット", &e);
   }

   let session_data = SessionData::new(
      user.id,
      user.email.clone(),
      user.display_name(),
      vec![user.role.clone()],
   );
   match state.session_manager.create(&session_data).await {
      Ok(session_id) => {
         let jar = jar.add(build_session_cookie(&session_id, state.secure_cookie));
         (jar, Json(LoginResponseData { user })).into_response()
      }
      Err(e) => {
         tracing::error!(
            error.category = "infrastructure",
            error.kind = "session",
            "セッション作成に失敗: {}",
            e
         );
         internal_error_response(LOGIN_ERROR_MESSAGE)
      }
   }
}

/// POST /api/v1/auth/logout
///
/// セッションがなくても成功扱いにし、Cookie を必ずクリアする。
pub async fn logout(State(state): State<Arc<UserState>>, jar: CookieJar) -> Response {
   if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
      let deleted = state.session_manager.delete(cookie.value()).await;
      if let Err(e) = deleted {
         tracing::warn!("セッション削除に失敗（無視）: {}", e);
      }
   }

   let jar = jar.add(build_clear_cookie(state.secure_cookie));
   (jar, message_response("ログアウトしました")).into_response()
}

/// GET /api/v1/auth/me
pub async fn me(
   State(state): State<Arc<UserState>>,
   current_user: Option<Extension<CurrentUser>>,
) -> Response {
   let Some(Extension(user)) = current_user else {
      return unauthorized_response();
   };

   match state.core_service_client.get_user_by_id(user.user_id).await {
      Ok(response) => Json(response.into_inner()).into_response(),
      Err(e) => service_error_response(
         &format!("ログインユーザー取得(user_id={})", user.user_id),
         "ユーザー情報の取得に失敗しました",
         e,
      ),
   }
}

// --- ユーザー管理 ---

/// POST /api/v1/users
pub async fn create_user(
   State(state): State<Arc<UserState>>,
   payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Response {
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };
   if let Err(errors) = req.validate() {
      return validation_errors_response(&errors);
   }

   let core_request = CreateUserCoreRequest::from(req);
   match state.core_service_client.create_user(&core_request).await {
      Ok(response) => (StatusCode::CREATED, Json(response.into_inner())).into_response(),
      Err(e) => service_error_response("ユーザー作成", "ユーザーの作成に失敗しました", e),
   }
}

/// GET /api/v1/users/{id}
pub async fn get_user(State(state): State<Arc<UserState>>, Path(id): Path<String>) -> Response {
   let Ok(user_id) = Uuid::parse_str(id.trim()) else {
      return bad_request_response(INVALID_USER_ID_MESSAGE);
   };

   match state.core_service_client.get_user_by_id(user_id).await {
      Ok(response) => Json(response.into_inner()).into_response(),
      Err(e) => service_error_response(
         &format!("ユーザー取得(user_id={user_id})"),
         "ユーザー情報の取得に失敗しました",
         e,
      ),
   }
}

/// GET /api/v1/users/by-email?email=
pub async fn get_user_by_email(
   State(state): State<Arc<UserState>>,
   Query(query): Query<UserByEmailQuery>,
) -> Response {
   let Some(email) = non_blank(query.email.as_deref()) else {
      return bad_request_response("メールアドレスが必要です");
   };

   match state.core_service_client.get_user_by_email(email).await {
      Ok(response) => Json(response.into_inner()).into_response(),
      Err(e) => service_error_response(
         "メールアドレスでのユーザー検索",
         "ユーザー情報の取得に失敗しました",
         e,
      ),
   }
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
   State(state): State<Arc<UserState>>,
   Path(id): Path<String>,
   payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Response {
   let Ok(user_id) = Uuid::parse_str(id.trim()) else {
      return bad_request_response(INVALID_USER_ID_MESSAGE);
   };
   let Ok(Json(req)) = payload else {
      return bad_request_response(INVALID_REQUEST_MESSAGE);
   };

   let core_request = UpdateUserCoreRequest::from(req);
   match state
      .core_service_client
      .update_user(user_id, &core_request)
      .await
   {
      Ok(response) => Json(response.into_inner()).into_response(),
      Err(e) => service_error_response(
         &format!("ユーザー更新(user_id={user_id})"),
         "ユーザー情報の更新に失敗しました",
         e,
      ),
   }
}

/// POST /api/v1/users/{id}/unlock
///
/// Core Service 側の解除後、返されたユーザーのメールアドレスで失敗回数をリセットする。
pub async fn unlock_account(
   State(state): State<Arc<UserState>>,
   Path(id): Path<String>,
) -> Response {
   let Ok(user_id) = Uuid::parse_str(id.trim()) else {
      return bad_request_response(INVALID_USER_ID_MESSAGE);
   };

   let user = match state.core_service_client.unlock_account(user_id).await {
      Ok(response) => response.into_inner(),
      Err(e) => {
         return service_error_response(
            &format!("アカウントロック解除(user_id={user_id})"),
            "アカウントのロック解除に失敗しました",
            e,
         );
      }
   };

   if let Err(e) = state.login_attempt_store.reset(&user.email).await {
      tracing::error!(
         error.category = "infrastructure",
         error.kind = "login_attempt",
         "ログイン失敗回数のリセットに失敗(user_id={}): {}",
         user_id,
         e
      );
      return internal_error_response("アカウントのロック解除に失敗しました");
   }

   message_response("アカウントのロックを解除しました")
}

// --- ヘルパー関数 ---

/// セッション Cookie を構築する
fn build_session_cookie(session_id: &str, secure: bool) -> Cookie<'static> {
   Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
      .path("/")
      .max_age(time::Duration::seconds(SESSION_TTL_SECONDS as i64))
      .http_only(true)
      .same_site(SameSite::Lax)
      .secure(secure)
      .build()
}

/// セッション Cookie をクリアする Cookie を構築する
fn build_clear_cookie(secure: bool) -> Cookie<'static> {
   Cookie::build((SESSION_COOKIE_NAME, ""))
      .path("/")
      .max_age(time::Duration::seconds(0))
      .http_only(true)
      .same_site(SameSite::Lax)
      .secure(secure)
      .build()
}

fn login_store_error(operation: &str, e: &InfraError) -> Response {
   tracing::error!(
      error.category = "infrastructure",
      error.kind = "login_attempt",
      "{}に失敗: {}",
      operation,
      e
   );
   internal_error_response(LOGIN_ERROR_MESSAGE)
}
