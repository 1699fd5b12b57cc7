// Process-wide MongoDB client.
//
// The first caller connects; concurrent first callers await the same
// in-flight initialization and every later caller gets the cached client.
// `Client` is reference counted internally, so handing out clones shares
// one connection pool.

use std::future::Future;

use mongodb::Client;
use tokio::sync::OnceCell;

use docauth_core::error::{AdapterError, AdapterResult};

/// A lazily connected client slot.
#[derive(Debug)]
pub struct ClientCell {
    cell: OnceCell<Client>,
}

impl ClientCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the client, connecting to `uri` if this is the first call.
    ///
    /// Once initialized, `uri` is ignored. A failed connect leaves the cell
    /// empty so the next caller retries.
    pub async fn get_or_connect(&self, uri: &str) -> AdapterResult<&Client> {
        self.get_or_init_with(move || async move {
            tracing::info!("Connecting to MongoDB");
            Client::with_uri_str(uri)
                .await
                .map_err(|e| AdapterError::Database(format!("MongoDB connection failed: {e}")))
        })
        .await
    }

    /// Run `init` at most once across all concurrent callers.
    pub(crate) async fn get_or_init_with<F, Fut>(&self, init: F) -> AdapterResult<&Client>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AdapterResult<Client>>,
    {
        self.cell.get_or_try_init(init).await
    }

    pub fn get(&self) -> Option<&Client> {
        self.cell.get()
    }
}

impl Default for ClientCell {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: ClientCell = ClientCell::new();

/// The process-wide client.
pub async fn shared_client(uri: &str) -> AdapterResult<Client> {
    SHARED.get_or_connect(uri).await.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::future::join_all;

    // `with_uri_str` only parses the URI; no server is contacted.
    const URI: &str = "mongodb://localhost:27017";

    #[tokio::test]
    async fn test_racing_callers_share_one_init() {
        let cell = &ClientCell::new();
        let counter = AtomicUsize::new(0);
        let inits = &counter;

        let callers = (0..16).map(move |_| {
            cell.get_or_init_with(move || async move {
                inits.fetch_add(1, Ordering::SeqCst);
                // Park mid-init so the other callers arrive while it is in flight.
                tokio::task::yield_now().await;
                Client::with_uri_str(URI)
                    .await
                    .map_err(|e| AdapterError::Database(e.to_string()))
            })
        });
        let clients = join_all(callers).await;

        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert!(clients.iter().all(|c| c.is_ok()));
    }

    #[tokio::test]
    async fn test_failed_init_is_retried_once_per_attempt() {
        let cell = &ClientCell::new();
        let counter = AtomicUsize::new(0);
        let inits = &counter;

        let failed = cell
            .get_or_init_with(move || async move {
                inits.fetch_add(1, Ordering::SeqCst);
                Err(AdapterError::Database("unreachable".into()))
            })
            .await;
        assert!(failed.is_err());

        let callers = (0..4).map(move |_| {
            cell.get_or_init_with(move || async move {
                inits.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Client::with_uri_str(URI)
                    .await
                    .map_err(|e| AdapterError::Database(e.to_string()))
            })
        });
        assert!(join_all(callers).await.iter().all(|c| c.is_ok()));
        assert_eq!(inits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_later_uri_is_ignored() {
        let cell = ClientCell::new();
        let first: *const Client = cell.get_or_connect(URI).await.unwrap();
        let second: *const Client = cell
            .get_or_connect("mongodb://elsewhere:27018")
            .await
            .unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[tokio::test]
    async fn test_invalid_uri_leaves_cell_empty() {
        let cell = ClientCell::new();
        let err = cell.get_or_connect("not-a-uri").await.unwrap_err();
        assert!(matches!(err, AdapterError::Database(_)));
        assert!(cell.get().is_none());

        assert!(cell.get_or_connect(URI).await.is_ok());
        assert!(cell.get().is_some());
    }
}
