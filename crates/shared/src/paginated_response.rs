//! # 一覧レスポンス
//!
//! 一覧系エンドポイントの 2 種類のエンベロープを提供する。
//!
//! - [`ListResponse`]: `{ "items": [...], "total": n }`
//! - [`PageResponse`]: `{ "items": [...], "total": n, "page": p, "limit": l }`

use serde::{Deserialize, Serialize};

/// ページ情報を持たない一覧レスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
   pub items: Vec<T>,
   pub total: u64,
}

impl<T> ListResponse<T> {
   /// `total` を要素数から算出して作成する
   pub fn from_items(items: Vec<T>) -> Self {
      let total = items.len() as u64;
      Self { items, total }
   }
}

/// ページ番号ベースのページネーション付きレスポンス
///
/// `page` / `limit` にはハンドラが実際に適用した値（デフォルト・上限適用後）を入れる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
   pub items: Vec<T>,
   pub total: u64,
   pub page:  u32,
   pub limit: u32,
}

impl<T> PageResponse<T> {
   pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
      Self {
         items,
         total,
         page,
         limit,
      }
   }

   /// データなし（有効な空状態）
   pub fn empty(page: u32, limit: u32) -> Self {
      Self::new(Vec::new(), 0, page, limit)
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_list_responseのtotalが要素数になる() {
      let response = ListResponse::from_items(vec!["a", "b", "c"]);

      assert_eq!(response.total, 3);
   }

   #[test]
   fn test_page_response_emptyが空の一覧を返す() {
      let json = serde_json::to_value(PageResponse::<String>::empty(2, 20)).unwrap();

      assert_eq!(
         json,
         serde_json::json!({
            "items": [],
            "total": 0,
            "page": 2,
            "limit": 20
         })
      );
   }
}
