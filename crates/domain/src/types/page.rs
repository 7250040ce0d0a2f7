//! Cursor-paged list results

use serde::{Deserialize, Serialize};

/// Pagination metadata accompanying a list result.
///
/// `has_next_page` may be absent on some operations; an unknown value is
/// treated as "no further pages" by consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
}

/// One page of an ordered server-side result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page_info: PageInfo) -> Self {
        Self { data, page_info }
    }

    /// Whether the server reported a further page. Unknown counts as no.
    pub fn has_next_page(&self) -> bool {
        self.page_info.has_next_page.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_has_next_page_is_falsy() {
        let page: Page<u8> = Page::new(vec![1, 2], PageInfo::default());
        assert!(!page.has_next_page());
    }

    #[test]
    fn deserializes_camel_case_page_info() {
        let page: Page<String> = serde_json::from_str(
            r#"{"data":["a"],"pageInfo":{"endCursor":"X","hasNextPage":true}}"#,
        )
        .expect("page");
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("X"));
        assert!(page.has_next_page());
    }
}
