//! # テスト用インメモリ実装
//!
//! API 層のハンドラテストで使用する。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! kanri-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
   collections::HashMap,
   sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
   InfraError,
   login_attempt::{LoginAttemptStore, attempt_key},
   session::{SESSION_TTL_SECONDS, SessionData, SessionManager},
};

// ===== MockSessionManager =====

#[derive(Clone, Default)]
pub struct MockSessionManager {
   sessions: Arc<Mutex<HashMap<String, SessionData>>>,
}

impl MockSessionManager {
   pub fn new() -> Self {
      Self::default()
   }

   /// 指定した ID でセッションを登録する
   pub fn insert(&self, session_id: &str, data: SessionData) {
      self.sessions
         .lock()
         .unwrap()
         .insert(session_id.to_string(), data);
   }

   pub fn len(&self) -> usize {
      self.sessions.lock().unwrap().len()
   }

   pub fn is_empty(&self) -> bool {
      self.len() == 0
   }
}

#[async_trait]
impl SessionManager for MockSessionManager {
   async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
      let session_id = uuid::Uuid::new_v4().to_string();
      self.insert(&session_id, data.clone());
      Ok(session_id)
   }

   async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
      Ok(self.sessions.lock().unwrap().get(session_id).cloned())
   }

   async fn delete(&self, session_id: &str) -> Result<(), InfraError> {
      self.sessions.lock().unwrap().remove(session_id);
      Ok(())
   }

   async fn get_ttl(&self, session_id: &str) -> Result<Option<i64>, InfraError> {
      let exists = self.sessions.lock().unwrap().contains_key(session_id);
      Ok(exists.then_some(SESSION_TTL_SECONDS as i64))
   }
}

// ===== MockLoginAttemptStore =====

#[derive(Clone, Default)]
pub struct MockLoginAttemptStore {
   counts: Arc<Mutex<HashMap<String, u32>>>,
}

impl MockLoginAttemptStore {
   pub fn new() -> Self {
      Self::default()
   }

   /// 試行回数を直接設定する
   pub fn set_count(&self, email: &str, count: u32) {
      self.counts.lock().unwrap().insert(attempt_key(email), count);
   }

   /// 現在の試行回数を返す（記録がなければ 0）
   pub fn count(&self, email: &str) -> u32 {
      self.counts
         .lock()
         .unwrap()
         .get(&attempt_key(email))
         .copied()
         .unwrap_or(0)
   }
}

#[async_trait]
impl LoginAttemptStore for MockLoginAttemptStore {
   async fn reserve_attempt(&self, email: &str) -> Result<u32, InfraError> {
      let mut counts = self.counts.lock().unwrap();
      let count = counts.entry(attempt_key(email)).or_insert(0);
      *count += 1;
      Ok(*count)
   }

   async fn release_attempt(&self, email: &str) -> Result<(), InfraError> {
      if let Some(count) = self.counts.lock().unwrap().get_mut(&attempt_key(email)) {
         *count = count.saturating_sub(1);
      }
      Ok(())
   }

   async fn reset(&self, email: &str) -> Result<(), InfraError> {
      self.counts.lock().unwrap().remove(&attempt_key(email));
      Ok(())
   }
}
