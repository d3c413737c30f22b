//! # セッション管理
//!
//! Redis を使用したセッション管理を提供する。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `session:{session_id}` | SessionData (JSON) | 28800秒（8時間） |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::InfraError;

/// セッションの有効期限（秒）
/// 8時間 = 28800秒
pub const SESSION_TTL_SECONDS: u64 = 28800;

/// セッションデータ
///
/// Redis に JSON 形式で保存されるセッション情報。
/// ログイン成功時に作成され、ログアウトまたは TTL 経過で削除される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
   user_id:          Uuid,
   email:            String,
   name:             String,
   roles:            Vec<String>,
   created_at:       DateTime<Utc>,
   last_accessed_at: DateTime<Utc>,
}

impl SessionData {
   /// 新しいセッションデータを作成する
   ///
   /// `created_at` と `last_accessed_at` は現在時刻で初期化される。
   pub fn new(user_id: Uuid, email: String, name: String, roles: Vec<String>) -> Self {
      let now = Utc::now();
      Self {
         user_id,
         email,
         name,
         roles,
         created_at: now,
         last_accessed_at: now,
      }
   }

   pub fn user_id(&self) -> Uuid {
      self.user_id
   }

   pub fn email(&self) -> &str {
      &self.email
   }

   pub fn name(&self) -> &str {
      &self.name
   }

   pub fn roles(&self) -> &[String] {
      &self.roles
   }

   pub fn created_at(&self) -> DateTime<Utc> {
      self.created_at
   }

   pub fn last_accessed_at(&self) -> DateTime<Utc> {
      self.last_accessed_at
   }
}

/// セッション管理トレイト
///
/// 実装は Redis を使用する [`RedisSessionManager`] を参照。
#[async_trait]
pub trait SessionManager: Send + Sync {
   /// セッションを作成し、セッション ID（UUID v4）を返す
   async fn create(&self, data: &SessionData) -> Result<String, InfraError>;

   /// セッションを取得する
   ///
   /// セッションが存在すれば `Some(SessionData)`、なければ `None`
   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError>;

   /// セッションを削除する
   ///
   /// 存在しないセッションを削除しても成功とする。
   async fn delete(&self, session_id: &str) -> Result<(), InfraError>;

   /// セッションの TTL（残り秒数）を取得する
   async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError>;
}

/// Redis を使用したセッションマネージャ
pub struct RedisSessionManager {
   conn: ConnectionManager,
}

impl RedisSessionManager {
   /// Redis URL から接続を作成する
   pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
      let conn = crate::redis::create_connection_manager(redis_url).await?;
      Ok(Self { conn })
   }

   /// 既存の接続を共有して作成する
   pub fn from_connection(conn: ConnectionManager) -> Self {
      Self { conn }
   }

   fn session_key(session_id: &str) -> String {
      format!("session:{session_id}")
   }
}

#[async_trait]
impl SessionManager for RedisSessionManager {
   async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
      // UUID v4 でセッション ID を生成（暗号論的に安全なランダム値）
      let session_id = Uuid::new_v4().to_string();
      let key = Self::session_key(&session_id);
      let json = serde_json::to_string(data)?;

      let mut conn = self.conn.clone();
      let _: () = conn.set_ex(&key, json, SESSION_TTL_SECONDS).await?;

      Ok(session_id)
   }

   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
      let key = Self::session_key(session_id);
      let mut conn = self.conn.clone();

      let result: Option<String> = conn.get(&key).await?;

      match result {
         Some(json) => {
            let data: SessionData = serde_json::from_str(&json)?;
            Ok(Some(data))
         }
         None => Ok(None),
      }
   }

   async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
      let key = Self::session_key(session_id);
      let mut conn = self.conn.clone();
      let _: () = conn.del(&key).await?;
      Ok(())
   }

   async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError> {
      let key = Self::session_key(session_id);
      let mut conn = self.conn.clone();

      let ttl: i64 = conn.ttl(&key).await?;

      // -2: キーが存在しない, -1: TTL 未設定
      if ttl < 0 { Ok(None) } else { Ok(Some(ttl)) }
   }
}
