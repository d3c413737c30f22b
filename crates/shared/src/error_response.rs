//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換は API 側の責務（shared に axum 依存を入れない）
//! - `code` は機械可読なエラーコード。未設定の場合は JSON に出力しない

use serde::{Deserialize, Serialize};

/// 未実装エンドポイントのエラーコード
pub const NOT_IMPLEMENTED_CODE: &str = "NOT_IMPLEMENTED";

/// エラーレスポンス
///
/// ```json
/// { "error": "メンバーIDが必要です" }
/// { "error": "無効な経費IDです", "code": "INVALID_EXPENSE_ID" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
   pub error: String,
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub code:  Option<String>,
}

impl ErrorResponse {
   /// メッセージのみのエラーを作成する
   pub fn new(error: impl Into<String>) -> Self {
      Self {
         error: error.into(),
         code:  None,
      }
   }

   /// エラーコード付きのエラーを作成する
   pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
      Self {
         error: error.into(),
         code:  Some(code.into()),
      }
   }

   /// 501 Not Implemented 用
   pub fn not_implemented(error: impl Into<String>) -> Self {
      Self::with_code(error, NOT_IMPLEMENTED_CODE)
   }

   /// 500 Internal Server Error
   ///
   /// メッセージは固定値（内部情報を漏らさないため）。
   pub fn internal_error() -> Self {
      Self::new("内部エラーが発生しました")
   }
}
