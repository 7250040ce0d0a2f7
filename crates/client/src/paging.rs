//! Cursor-based pagination
//!
//! [`PagingResponse`] wraps one page of results together with the fetcher
//! that produced it, so callers can walk a result set without knowing the
//! underlying query shape. Page N+1 is always requested with page N's end
//! cursor; fetch failures surface as a [`PageTurn::Failed`] value rather
//! than an error, so pagination can be consumed with one uniform match.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hiveport_domain::{Page, PageInfo, Result};
use serde_json::Value;
use tracing::debug;

use crate::client::HiveConfig;

/// GraphQL named-variables object.
pub type Variables = serde_json::Map<String, Value>;

/// Fetches one page of a list operation.
///
/// Implementations receive the static variables plus the pagination fields
/// (`after`, `first`) merged in by the caller.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, config: &HiveConfig, variables: &Variables) -> Result<Page<T>>;
}

/// Outcome of advancing a [`PagingResponse`] by one page.
#[derive(Debug)]
pub enum PageTurn<T> {
    /// A further page, wrapped the same way as the first.
    Next(PagingResponse<T>),
    /// The current page was the last one; no fetch was performed.
    End,
    /// The fetch failed; carries an HTTP-style code (400) and the bare
    /// error message.
    Failed { code: u16, message: String },
}

/// One page of results plus the means to fetch the next.
///
/// Instances are immutable: advancing produces a new `PagingResponse`
/// sharing the same fetcher, config, and static variables. Concurrent
/// `next_page` calls on the same instance are not de-duplicated; traversal
/// is expected to be sequential.
pub struct PagingResponse<T> {
    page: Page<T>,
    config: HiveConfig,
    variables: Variables,
    fetcher: Arc<dyn PageFetcher<T>>,
    created_at: DateTime<Utc>,
}

impl<T> std::fmt::Debug for PagingResponse<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagingResponse")
            .field("items", &self.page.data.len())
            .field("page_info", &self.page.page_info)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl<T> PagingResponse<T> {
    /// Wrap a fetched page.
    ///
    /// `variables` are the static operation variables, excluding the
    /// pagination cursors; `after` and `first` are managed by `next_page`.
    pub fn new(
        fetcher: Arc<dyn PageFetcher<T>>,
        config: HiveConfig,
        variables: Variables,
        page: Page<T>,
    ) -> Self {
        Self { page, config, variables, fetcher, created_at: Utc::now() }
    }

    /// HTTP-style status code. A wrapped page is always a success.
    pub fn code(&self) -> u16 {
        200
    }

    pub fn data(&self) -> &[T] {
        &self.page.data
    }

    pub fn page_info(&self) -> &PageInfo {
        &self.page.page_info
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the server reported a further page. Pure function of the
    /// current page's metadata; an unknown value counts as no.
    pub fn has_next_page(&self) -> bool {
        self.page.has_next_page()
    }

    /// Fetch the next page.
    ///
    /// Resolves to [`PageTurn::End`] without any network call when the
    /// current page is the last. The fetcher is invoked with the static
    /// variables plus `after` set to the current end cursor and an explicit
    /// null `first` (the remote applies its default page size).
    pub async fn next_page(&self) -> PageTurn<T> {
        if !self.has_next_page() {
            return PageTurn::End;
        }

        let mut variables = self.variables.clone();
        variables.insert(
            "after".to_string(),
            match &self.page.page_info.end_cursor {
                Some(cursor) => Value::String(cursor.clone()),
                None => Value::Null,
            },
        );
        variables.insert("first".to_string(), Value::Null);

        debug!(after = ?self.page.page_info.end_cursor, "fetching next page");

        match self.fetcher.fetch_page(&self.config, &variables).await {
            Ok(page) => PageTurn::Next(Self {
                page,
                config: self.config.clone(),
                variables: self.variables.clone(),
                fetcher: Arc::clone(&self.fetcher),
                created_at: Utc::now(),
            }),
            Err(err) => PageTurn::Failed { code: 400, message: err.message().to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hiveport_domain::HiveError;
    use serde_json::json;
    use tokio::sync::Mutex;

    use super::*;

    fn config() -> HiveConfig {
        HiveConfig::new("https://hive.example", "k", "s")
    }

    fn variables(pairs: &[(&str, Value)]) -> Variables {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn page(items: &[u32], end_cursor: Option<&str>, has_next: Option<bool>) -> Page<u32> {
        Page::new(
            items.to_vec(),
            PageInfo {
                end_cursor: end_cursor.map(str::to_string),
                has_next_page: has_next,
            },
        )
    }

    /// Serves a fixed sequence of outcomes and records the variables each
    /// fetch was called with.
    struct ScriptedFetcher {
        calls: AtomicUsize,
        script: Vec<Result<Page<u32>>>,
        seen_variables: Mutex<Vec<Variables>>,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<Result<Page<u32>>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                script,
                seen_variables: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PageFetcher<u32> for ScriptedFetcher {
        async fn fetch_page(&self, _config: &HiveConfig, variables: &Variables) -> Result<Page<u32>> {
            let seq = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_variables.lock().await.push(variables.clone());
            self.script[seq].clone()
        }
    }

    #[tokio::test]
    async fn exhausted_page_ends_without_fetching() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let response = PagingResponse::new(
            fetcher.clone(),
            config(),
            Variables::new(),
            page(&[1, 2], Some("X"), Some(false)),
        );

        assert!(!response.has_next_page());
        assert!(matches!(response.next_page().await, PageTurn::End));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_has_next_page_counts_as_exhausted() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let response =
            PagingResponse::new(fetcher.clone(), config(), Variables::new(), page(&[], None, None));

        assert!(!response.has_next_page());
        assert!(matches!(response.next_page().await, PageTurn::End));
    }

    #[tokio::test]
    async fn continuation_uses_end_cursor_and_null_first() {
        let fetcher =
            ScriptedFetcher::new(vec![Ok(page(&[3, 4], Some("Y"), Some(false)))]);
        let response = PagingResponse::new(
            fetcher.clone(),
            config(),
            variables(&[("campaignId", json!("c-1"))]),
            page(&[1, 2], Some("X"), Some(true)),
        );

        let turn = response.next_page().await;
        let next = match turn {
            PageTurn::Next(next) => next,
            other => panic!("expected next page, got {:?}", other),
        };

        assert_eq!(next.code(), 200);
        assert_eq!(next.data(), &[3, 4]);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let seen = fetcher.seen_variables.lock().await;
        assert_eq!(seen[0].get("campaignId"), Some(&json!("c-1")));
        assert_eq!(seen[0].get("after"), Some(&json!("X")));
        assert_eq!(seen[0].get("first"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn chained_pages_advance_the_cursor() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page(&[3], Some("Y"), Some(true))),
            Ok(page(&[4], None, Some(false))),
        ]);
        let first = PagingResponse::new(
            fetcher.clone(),
            config(),
            Variables::new(),
            page(&[1], Some("X"), Some(true)),
        );

        let second = match first.next_page().await {
            PageTurn::Next(next) => next,
            other => panic!("expected next page, got {:?}", other),
        };
        let third = match second.next_page().await {
            PageTurn::Next(next) => next,
            other => panic!("expected next page, got {:?}", other),
        };
        assert!(matches!(third.next_page().await, PageTurn::End));

        let seen = fetcher.seen_variables.lock().await;
        assert_eq!(seen[0].get("after"), Some(&json!("X")));
        assert_eq!(seen[1].get("after"), Some(&json!("Y")));
    }

    #[tokio::test]
    async fn fetch_failure_becomes_a_value_not_an_error() {
        let fetcher =
            ScriptedFetcher::new(vec![Err(HiveError::Network("boom".to_string()))]);
        let response = PagingResponse::new(
            fetcher.clone(),
            config(),
            Variables::new(),
            page(&[1], Some("X"), Some(true)),
        );

        match response.next_page().await {
            PageTurn::Failed { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "boom");
            }
            other => panic!("expected failed turn, got {:?}", other),
        }
    }
}
