//! # クエリ・パスパラメータの解釈
//!
//! ページネーションと日時パラメータの扱いを全ハンドラで揃えるためのヘルパー。
//!
//! クエリ構造体のフィールドは `Option<String>` で受け取り、ここで解釈する。
//! 数値として不正な `limit` をエラーにせずデフォルトに戻すため。

use chrono::{DateTime, Utc};

/// 通常の一覧の `limit` デフォルト
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// 通常の一覧の `limit` 上限
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 解釈済みのページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
   pub page:  u32,
   pub limit: u32,
}

impl Pagination {
   /// `page` / `limit` を解釈する
   ///
   /// - `page`: 未指定・数値でない・0 以下は 1
   /// - `limit`: 未指定・数値でない・0 以下は `default_limit`、`max_limit` 超過は `max_limit`
   pub fn from_query(
      page: Option<&str>,
      limit: Option<&str>,
      default_limit: u32,
      max_limit: u32,
   ) -> Self {
      Self {
         page:  parse_page(page),
         limit: parse_limit(limit, default_limit, max_limit),
      }
   }

   /// 通常の一覧（20 / 100）として解釈する
   pub fn standard(page: Option<&str>, limit: Option<&str>) -> Self {
      Self::from_query(page, limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT)
   }
}

/// `page` を解釈する
pub fn parse_page(raw: Option<&str>) -> u32 {
   parse_positive(raw).unwrap_or(1)
}

/// `limit` を解釈する
pub fn parse_limit(raw: Option<&str>, default_limit: u32, max_limit: u32) -> u32 {
   parse_positive(raw).map_or(default_limit, |limit| limit.min(max_limit))
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
   let value: i64 = raw?.trim().parse().ok()?;
   if value <= 0 {
      return None;
   }
   Some(u32::try_from(value).unwrap_or(u32::MAX))
}

/// RFC3339 形式の日時パラメータを解釈する
///
/// 未指定・空文字は `Ok(None)`。形式不正は `Err` を返し、呼び出し側で 400 にする。
pub fn parse_rfc3339(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
   match non_blank(raw) {
      Some(value) => DateTime::parse_from_rfc3339(value)
         .map(|dt| Some(dt.with_timezone(&Utc))),
      None => Ok(None),
   }
}

/// 前後の空白を除いて空でなければ返す
pub fn non_blank(raw: Option<&str>) -> Option<&str> {
   raw.map(str::trim).filter(|value| !value.is_empty())
}
