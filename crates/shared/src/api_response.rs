//! # Core Service ワイヤーエンベロープ
//!
//! Core Service の内部 API が返す `{ "data": T }` 形式を表す。
//! クライアントはこの型でデシリアライズし、`data` だけをハンドラに渡す。

use serde::{Deserialize, Serialize};

/// Core Service 内部 API の統一レスポンス型
///
/// ## 使用例
///
/// ```
/// use kanri_shared::ApiResponse;
///
/// let response = ApiResponse::new("hello");
/// assert_eq!(response.data, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
   pub data: T,
}

impl<T> ApiResponse<T> {
   /// 新しい `ApiResponse` を作成する
   pub fn new(data: T) -> Self {
      Self { data }
   }

   /// エンベロープを外してペイロードを取り出す
   pub fn into_inner(self) -> T {
      self.data
   }
}
