//! # API 設定
//!
//! 環境変数から API サーバーの設定を読み込む。
//!
//! ## 環境変数一覧
//!
//! | 変数名 | 必須 | デフォルト | 説明 |
//! |--------|------|------------|------|
//! | `API_HOST` | No | `0.0.0.0` | バインドアドレス |
//! | `API_PORT` | **Yes** | - | ポート番号 |
//! | `REDIS_URL` | **Yes** | - | セッション・ログイン試行回数の保存先 |
//! | `CORE_URL` | **Yes** | - | Core Service のベース URL |
//! | `LOGIN_MAX_ATTEMPTS` | No | `5` | ログインロックまでの失敗回数 |
//! | `LOGIN_LOCK_SECONDS` | No | `900` | ログイン失敗回数の保持期間（秒） |
//! | `ENV` | No | - | `production` のとき Cookie に `Secure` を付与する |
//!
//! ログ関連（`LOG_FORMAT` / `RUST_LOG`）は `kanri_shared::observability` が読み込む。

use std::env;

use thiserror::Error;
use url::Url;

/// ログイン失敗回数のデフォルト上限
pub const DEFAULT_LOGIN_MAX_ATTEMPTS: u32 = 5;

/// ログイン失敗回数のデフォルト保持期間（15 分）
pub const DEFAULT_LOGIN_LOCK_SECONDS: u64 = 900;

/// 設定読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
   /// 必須の環境変数が未設定
   #[error("{0} が設定されていません")]
   Missing(&'static str),

   /// 値の形式が不正
   #[error("{name} の値が不正です: {value}")]
   Invalid { name: &'static str, value: String },
}

/// ログインロックの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginLockConfig {
   /// この回数以上失敗したメールアドレスはロックする
   pub max_attempts: u32,
   /// 失敗回数の保持期間（秒）
   pub lock_seconds: u64,
}

impl Default for LoginLockConfig {
   fn default() -> Self {
      Self {
         max_attempts: DEFAULT_LOGIN_MAX_ATTEMPTS,
         lock_seconds: DEFAULT_LOGIN_LOCK_SECONDS,
      }
   }
}

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct ApiConfig {
   /// バインドアドレス
   pub host:          String,
   /// ポート番号
   pub port:          u16,
   /// Redis 接続 URL
   pub redis_url:     String,
   /// Core Service の URL
   pub core_url:      String,
   /// ログインロック設定
   pub login_lock:    LoginLockConfig,
   /// Cookie に `Secure` 属性を付与するか
   pub secure_cookie: bool,
}

impl ApiConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|name| env::var(name).ok())
   }

   /// 任意の取得関数から設定を読み込む
   ///
   /// テストでプロセスの環境変数に触れずに検証するために分けている。
   pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
   where
      F: Fn(&'static str) -> Option<String>,
   {
      let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

      let port = parse_value("API_PORT", &required("API_PORT")?)?;
      let redis_url = required("REDIS_URL")?;
      let core_url = required("CORE_URL")?;
      Url::parse(&core_url).map_err(|_| ConfigError::Invalid {
         name:  "CORE_URL",
         value: core_url.clone(),
      })?;

      let max_attempts = match lookup("LOGIN_MAX_ATTEMPTS") {
         Some(value) => parse_value("LOGIN_MAX_ATTEMPTS", &value)?,
         None => DEFAULT_LOGIN_MAX_ATTEMPTS,
      };
      let lock_seconds = match lookup("LOGIN_LOCK_SECONDS") {
         Some(value) => parse_value("LOGIN_LOCK_SECONDS", &value)?,
         None => DEFAULT_LOGIN_LOCK_SECONDS,
      };

      Ok(Self {
         host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
         port,
         redis_url,
         core_url,
         login_lock: LoginLockConfig {
            max_attempts,
            lock_seconds,
         },
         secure_cookie: lookup("ENV").is_some_and(|v| v.eq_ignore_ascii_case("production")),
      })
   }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
   value.trim().parse().map_err(|_| ConfigError::Invalid {
      name,
      value: value.to_string(),
   })
}
