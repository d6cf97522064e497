use std::sync::Arc;

use tokio::sync::Mutex;

/// Shared slot for the bearer token issued by the auth endpoint.
///
/// The backend never tells us a TTL up front; the only invalidation signal
/// is a 401 on a pricing call, so the cache holds the token until then.
#[derive(Clone, Default)]
pub(crate) struct TokenCache {
    inner: Arc<Mutex<Option<String>>>,
}

impl TokenCache {
    pub(crate) async fn current(&self) -> Option<String> {
        self.inner.lock().await.clone()
    }

    pub(crate) async fn store(&self, token: String) {
        *self.inner.lock().await = Some(token);
    }

    pub(crate) async fn invalidate(&self) {
        *self.inner.lock().await = None;
    }
}
