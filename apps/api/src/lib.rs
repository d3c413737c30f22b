//! # Kanri API サーバー
//!
//! フロントエンド向けの HTTP ハンドラ層。リクエストを解釈して Core Service の
//! 対応する操作を 1 回呼び出し、結果をレスポンスに変換する。
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │   Frontend  │────▶│  kanri-api  │────▶│ Core Service │
//! └─────────────┘     └──────┬──────┘     └──────────────┘
//!                            │
//!                            ▼
//!                      ┌───────────┐
//!                      │   Redis   │ セッション・ログイン失敗回数
//!                      └───────────┘
//! ```
//!
//! ## モジュール構成
//!
//! - [`app_builder`]: State の組み立てとルーター定義
//! - [`client`]: Core Service クライアント
//! - [`config`]: 環境変数からの設定読み込み
//! - [`error`]: エラーレスポンスのヘルパー
//! - [`handler`]: HTTP ハンドラ
//! - [`middleware`]: 認証・認可・Request ID・キャッシュ制御
//! - [`params`]: クエリパラメータの解釈

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod params;
