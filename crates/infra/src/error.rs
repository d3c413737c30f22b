//! # インフラ層エラー定義
//!
//! Redis との通信やシリアライズで発生するエラーを表現する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターン:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別
//!
//! どの生成経路でも生成時点のスパン情報を記録する。セッション取得の失敗は
//! 認証ミドルウェアのログに、ログイン失敗回数の操作の失敗はログインハンドラのログに出る。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// if let InfraErrorKind::Redis(e) = error.kind() {
///     tracing::error!(error.kind = "redis", "{}", e);
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
   kind:       InfraErrorKind,
   span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
   /// Redis への接続失敗、コマンド実行エラーなど
   #[error("Redis エラー: {0}")]
   Redis(#[source] redis::RedisError),

   /// セッションの JSON 変換に失敗した場合
   #[error("シリアライズエラー: {0}")]
   Serialization(#[source] serde_json::Error),

   /// 保存値が想定外の形式だった場合
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

impl InfraError {
   fn capture(kind: InfraErrorKind) -> Self {
      Self {
         kind,
         span_trace: SpanTrace::capture(),
      }
   }

   pub fn kind(&self) -> &InfraErrorKind {
      &self.kind
   }

   pub fn span_trace(&self) -> &SpanTrace {
      &self.span_trace
   }

   /// 予期しないエラーを生成する
   pub fn unexpected(msg: impl Into<String>) -> Self {
      Self::capture(InfraErrorKind::Unexpected(msg.into()))
   }
}

impl fmt::Debug for InfraError {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("InfraError")
         .field("kind", &self.kind)
         .field("span_trace", &self.span_trace)
         .finish()
   }
}

impl std::error::Error for InfraError {
   fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
      self.kind.source()
   }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<redis::RedisError> for InfraError {
   fn from(source: redis::RedisError) -> Self {
      Self::capture(InfraErrorKind::Redis(source))
   }
}

impl From<serde_json::Error> for InfraError {
   fn from(source: serde_json::Error) -> Self {
      Self::capture(InfraErrorKind::Serialization(source))
   }
}

#[cfg(test)]
mod tests {
   use tracing_subscriber::layer::SubscriberExt as _;

   use super::*;

   /// テスト用に ErrorLayer 付き subscriber を設定する
   fn with_error_layer(f: impl FnOnce()) {
      let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
      let _guard = tracing::subscriber::set_default(subscriber);
      f();
   }

   #[test]
   fn test_from_redis_errorでspan_traceがキャプチャされる() {
      with_error_layer(|| {
         let span = tracing::info_span!("test_session_get");
         let _enter = span.enter();

         let redis_err: redis::RedisError = (redis::ErrorKind::Io, "接続失敗").into();
         let err: InfraError = redis_err.into();

         assert!(matches!(err.kind(), InfraErrorKind::Redis(_)));
         let trace_str = format!("{}", err.span_trace());
         assert!(
            trace_str.contains("test_session_get"),
            "SpanTrace がスパン名を含むこと: {trace_str}",
         );
      });
   }

   #[test]
   fn test_from_serde_json_errorでspan_traceがキャプチャされる() {
      with_error_layer(|| {
         let span = tracing::info_span!("test_serialization");
         let _enter = span.enter();

         let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
         let err: InfraError = json_err.into();

         assert!(matches!(err.kind(), InfraErrorKind::Serialization(_)));
         let trace_str = format!("{}", err.span_trace());
         assert!(trace_str.contains("test_serialization"));
      });
   }

   #[test]
   fn test_unexpectedもspan_traceをキャプチャする() {
      with_error_layer(|| {
         let span = tracing::info_span!("test_reserve_attempt");
         let _enter = span.enter();

         let err = InfraError::unexpected("ログイン失敗回数が範囲外です: -1");

         assert!(matches!(
            err.kind(),
            InfraErrorKind::Unexpected(msg) if msg.ends_with("-1")
         ));
         assert!(format!("{}", err.span_trace()).contains("test_reserve_attempt"));
      });
   }

   #[test]
   fn test_displayがinfra_error_kindのメッセージを出力する() {
      let err = InfraError::unexpected("想定外");
      assert_eq!(format!("{err}"), "予期しないエラー: 想定外");
   }

   #[test]
   fn test_sourceがinfra_error_kindに委譲する() {
      use std::error::Error;

      let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
      let err: InfraError = json_err.into();

      assert!(err.source().is_some());
      assert!(InfraError::unexpected("x").source().is_none());
   }
}
