//! Core Service クライアントのエラー型
//!
//! Core Service が返したエラーはここで一度だけ分類し、ハンドラはタグでのみ分岐する。
//! 本文が平文メッセージのみの場合は [`CoreServiceError::from_plain_message`] の
//! 既知フレーズ表と完全一致で照合する。

use thiserror::Error;

/// 平文メッセージから種別を決める既知フレーズ表
///
/// 部分一致や正規化は行わない。表にない文言はすべて分類外として扱う。
const KNOWN_NOT_FOUND_MESSAGES: &[&str] = &[
   "ユーザーが見つかりません",
   "営業チームメンバーが見つかりません",
];

const KNOWN_CONFLICT_MESSAGES: &[&str] = &[
   "このユーザーは既に営業チームのメンバーです",
   "このメールアドレスは既に登録されています",
];

/// Core Service クライアントエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreServiceError {
   /// 対象が存在しない（404）
   #[error("{0}")]
   NotFound(String),

   /// 入力不正（400）
   #[error("{0}")]
   ValidationError(String),

   /// 資格情報の不一致など（401）
   #[error("{0}")]
   Unauthorized(String),

   /// 権限不足（403）
   #[error("{0}")]
   Forbidden(String),

   /// 一意制約・状態の競合（409）
   #[error("{0}")]
   Conflict(String),

   /// 機械可読なエラーコード付きのアプリケーションエラー
   ///
   /// ステータスとコードをそのままクライアントに返す。
   #[error("{message} ({code})")]
   App {
      status:  u16,
      code:    String,
      message: String,
   },

   /// 通信失敗・レスポンスのデコード失敗
   #[error("ネットワークエラー: {0}")]
   Network(String),

   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

impl CoreServiceError {
   /// 平文メッセージを既知フレーズ表と照合する
   ///
   /// 完全一致した場合のみ `NotFound` / `Conflict` を返す。
   pub fn from_plain_message(message: &str) -> Option<Self> {
      if KNOWN_NOT_FOUND_MESSAGES.contains(&message) {
         return Some(Self::NotFound(message.to_string()));
      }
      if KNOWN_CONFLICT_MESSAGES.contains(&message) {
         return Some(Self::Conflict(message.to_string()));
      }
      None
   }

   /// エラーレスポンスのステータス・本文から種別を決定する
   ///
   /// - コード付きの 4xx は `App`
   /// - 400 / 401 / 403 / 404 / 409 は対応するタグ
   /// - それ以外は既知フレーズ表で照合し、該当しなければ `Unexpected`
   pub fn from_status(status: u16, message: String, code: Option<String>) -> Self {
      if let Some(code) = code.filter(|_| (400..500).contains(&status)) {
         return Self::App {
            status,
            code,
            message,
         };
      }

      match status {
         400 => Self::ValidationError(message),
         401 => Self::Unauthorized(message),
         403 => Self::Forbidden(message),
         404 => Self::NotFound(message),
         409 => Self::Conflict(message),
         _ => Self::from_plain_message(&message).unwrap_or_else(|| {
            Self::Unexpected(format!("予期しないステータス {status}: {message}"))
         }),
      }
   }
}

impl From<reqwest::Error> for CoreServiceError {
   fn from(err: reqwest::Error) -> Self {
      CoreServiceError::Network(err.to_string())
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   #[rstest]
   #[case("ユーザーが見つかりません", Some(CoreServiceError::NotFound("ユーザーが見つかりません".to_string())))]
   #[case(
      "このユーザーは既に営業チームのメンバーです",
      Some(CoreServiceError::Conflict("このユーザーは既に営業チームのメンバーです".to_string()))
   )]
   #[case("ユーザーが見つかりません。", None)]
   #[case(" ユーザーが見つかりません", None)]
   #[case("ユーザーが見つかりませんでした", None)]
   #[case("既に営業チームのメンバーです", None)]
   #[case("", None)]
   fn test_from_plain_messageは完全一致のみ分類する(
      #[case] message: &str,
      #[case] expected: Option<CoreServiceError>,
   ) {
      assert_eq!(CoreServiceError::from_plain_message(message), expected);
   }

   #[rstest]
   #[case(400, CoreServiceError::ValidationError("x".to_string()))]
   #[case(401, CoreServiceError::Unauthorized("x".to_string()))]
   #[case(403, CoreServiceError::Forbidden("x".to_string()))]
   #[case(404, CoreServiceError::NotFound("x".to_string()))]
   #[case(409, CoreServiceError::Conflict("x".to_string()))]
   fn test_from_statusがステータスでタグを決める(
      #[case] status: u16,
      #[case] expected: CoreServiceError,
   ) {
      assert_eq!(
         CoreServiceError::from_status(status, "x".to_string(), None),
         expected
      );
   }

   #[test]
   fn test_from_status_コード付き4xxはappになる() {
      let err = CoreServiceError::from_status(
         422,
         "この提案は既に回答済みです".to_string(),
         Some("P002B001".to_string()),
      );

      assert_eq!(
         err,
         CoreServiceError::App {
            status:  422,
            code:    "P002B001".to_string(),
            message: "この提案は既に回答済みです".to_string(),
         }
      );
   }

   #[test]
   fn test_from_status_コード付きでも5xxはappにならない() {
      let err = CoreServiceError::from_status(
         500,
         "内部エラー".to_string(),
         Some("P001S001".to_string()),
      );

      assert!(matches!(err, CoreServiceError::Unexpected(_)));
   }

   #[test]
   fn test_from_status_500でも既知フレーズなら分類する() {
      let err = CoreServiceError::from_status(
         500,
         "このユーザーは既に営業チームのメンバーです".to_string(),
         None,
      );

      assert!(matches!(err, CoreServiceError::Conflict(_)));
   }

   #[test]
   fn test_from_status_未知の500はunexpectedになりステータスを含む() {
      let err = CoreServiceError::from_status(500, "db down".to_string(), None);

      match err {
         CoreServiceError::Unexpected(msg) => {
            assert!(msg.contains("500"), "{msg}");
            assert!(msg.contains("db down"), "{msg}");
         }
         other => panic!("Unexpected を期待したが {other:?} を受け取った"),
      }
   }
}
