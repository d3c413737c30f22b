//! # Kanri API サーバー
//!
//! ## 起動方法
//!
//! ```bash
//! API_PORT=13000 REDIS_URL=redis://localhost:6379 CORE_URL=http://localhost:13001 \
//!     cargo run -p kanri-api
//! ```
//!
//! 環境変数の一覧は [`kanri_api::config`] を参照。

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use kanri_api::{
   app_builder::{AppDependencies, build_app},
   client::CoreServiceClientImpl,
   config::ApiConfig,
   handler::ReadinessState,
};
use kanri_infra::{RedisLoginAttemptStore, RedisSessionManager, redis::create_connection_manager};
use kanri_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// API サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. Redis 接続とストアの初期化
/// 5. ルーターの構築
/// 6. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
   dotenvy::dotenv().ok();

   init_tracing(TracingConfig::from_env("kanri-api"));
   let _tracing_guard = tracing::info_span!("app", service = "kanri-api").entered();

   let config = ApiConfig::from_env().context("設定の読み込みに失敗しました")?;

   tracing::info!("API サーバーを起動します: {}:{}", config.host, config.port);

   // セッションとログイン失敗回数は同じ接続を共有する
   let redis_conn = create_connection_manager(&config.redis_url)
      .await
      .context("Redis への接続に失敗しました")?;
   let session_manager = Arc::new(RedisSessionManager::from_connection(redis_conn.clone()));
   let login_attempt_store = Arc::new(RedisLoginAttemptStore::new(
      redis_conn.clone(),
      config.login_lock.lock_seconds,
   ));

   let readiness_state = Arc::new(ReadinessState {
      redis_conn,
      core_service_url: config.core_url.clone(),
      http_client: reqwest::Client::new(),
   });

   let app = build_app(
      &config,
      AppDependencies {
         core_service_client: Arc::new(CoreServiceClientImpl::new(&config.core_url)),
         session_manager,
         login_attempt_store,
         readiness_state: Some(readiness_state),
      },
   );

   let addr: SocketAddr = format!("{}:{}", config.host, config.port)
      .parse()
      .context("アドレスのパースに失敗しました")?;

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("API サーバーが起動しました: {}", addr);

   axum::serve(listener, app).await?;

   Ok(())
}
