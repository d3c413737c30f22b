//! # ログイン試行回数の管理
//!
//! アカウントロック判定のため、メールアドレスごとのログイン試行回数を保持する。
//! カウンタはプロセス外（Redis）に置くため、再起動や複数インスタンスでも共有される。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `login_attempts:{email}` | 試行回数（整数） | ロック期間（デフォルト 900 秒） |
//!
//! カウンタは認証の前に INCR で予約する。同時に届いたログインも 1 件ずつ番号を受け取るため、
//! 上限を超えた番号の試行は認証まで進まない。認証結果が出なかった試行（Core Service の障害など）は
//! 予約を取り消す。
//!
//! TTL はカウンタ作成時に `SET NX EX` で設定し、INCR と同じトランザクションで実行する。
//! 以降の試行では延長しない。TTL 経過でカウンタは消え、ロックは自動解除される。

use async_trait::async_trait;
use redis::{AsyncCommands, Script, aio::ConnectionManager};

use crate::InfraError;

/// 予約を取り消す。キーが消えていれば何もしない（TTL なしのキーを作らない）
const RELEASE_SCRIPT: &str = r"
local count = tonumber(redis.call('GET', KEYS[1]) or '0')
if count > 0 then
  return redis.call('DECR', KEYS[1])
end
return 0
";

/// ログイン試行カウンタ
#[async_trait]
pub trait LoginAttemptStore: Send + Sync {
   /// 試行を 1 回予約し、予約後の回数を返す
   ///
   /// 戻り値が上限を超えていれば、それ以前の試行だけで上限に達している。
   async fn reserve_attempt(&self, email: &str) -> Result<u32, InfraError>;

   /// 認証結果が出なかった試行の予約を取り消す
   async fn release_attempt(&self, email: &str) -> Result<(), InfraError>;

   /// 回数をリセットする（ログイン成功時・ロック解除時）
   async fn reset(&self, email: &str) -> Result<(), InfraError>;
}

/// メールアドレスをカウンタのキーに正規化する
///
/// 大文字小文字や前後の空白の違いでロックを回避できないようにする。
pub fn attempt_key(email: &str) -> String {
   format!("login_attempts:{}", email.trim().to_lowercase())
}

/// Redis を使用したログイン試行カウンタ
pub struct RedisLoginAttemptStore {
   conn:           ConnectionManager,
   window_seconds: u64,
   release_script: Script,
}

impl RedisLoginAttemptStore {
   /// # 引数
   ///
   /// - `conn`: 共有する Redis 接続
   /// - `window_seconds`: カウンタの保持期間（ロック期間）
   pub fn new(conn: ConnectionManager, window_seconds: u64) -> Self {
      Self {
         conn,
         window_seconds,
         release_script: Script::new(RELEASE_SCRIPT),
      }
   }
}

#[async_trait]
impl LoginAttemptStore for RedisLoginAttemptStore {
   async fn reserve_attempt(&self, email: &str) -> Result<u32, InfraError> {
      let key = attempt_key(email);
      let mut conn = self.conn.clone();

      let (count,): (i64,) = redis::pipe()
         .atomic()
         .cmd("SET")
         .arg(&key)
         .arg(0)
         .arg("NX")
         .arg("EX")
         .arg(self.window_seconds)
         .ignore()
         .incr(&key, 1)
         .query_async(&mut conn)
         .await?;

      u32::try_from(count)
         .map_err(|_| InfraError::unexpected(format!("ログイン試行回数が範囲外です: {count}")))
   }

   async fn release_attempt(&self, email: &str) -> Result<(), InfraError> {
      let mut conn = self.conn.clone();
      let _: i64 = self
         .release_script
         .key(attempt_key(email))
         .invoke_async(&mut conn)
         .await?;
      Ok(())
   }

   async fn reset(&self, email: &str) -> Result<(), InfraError> {
      let mut conn = self.conn.clone();
      let _: () = conn.del(attempt_key(email)).await?;
      Ok(())
   }
}

#[cfg(test)]
mod tests {
   use rstest::rstest;

   use super::*;

   #[rstest]
   #[case("user@example.com", "login_attempts:user@example.com")]
   #[case("User@Example.COM", "login_attempts:user@example.com")]
   #[case("  user@example.com ", "login_attempts:user@example.com")]
   fn test_attempt_keyがメールアドレスを正規化する(#[case] email: &str, #[case] expected: &str) {
      assert_eq!(attempt_key(email), expected);
   }
}
