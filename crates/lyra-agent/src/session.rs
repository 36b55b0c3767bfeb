//! Credential-keyed cache of the upstream chat session

use lyra_ai::{ChatConfig, ChatSession, SessionProvider};
use parking_lot::Mutex;
use std::sync::Arc;

/// Handle to a live chat session
pub type SessionHandle = Arc<dyn ChatSession>;

/// Holds at most one session, keyed by the credential that created it.
///
/// Asking again with the same credential returns the identical handle, so the
/// upstream conversation keeps its memory. A different credential replaces the
/// cached session.
pub struct SessionCache {
    provider: Arc<dyn SessionProvider>,
    config: ChatConfig,
    slot: Mutex<Option<(String, SessionHandle)>>,
}

impl SessionCache {
    /// Create an empty cache that builds sessions through `provider`
    pub fn new(provider: Arc<dyn SessionProvider>, config: ChatConfig) -> Self {
        Self {
            provider,
            config,
            slot: Mutex::new(None),
        }
    }

    /// Configuration handed to every new session
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Return the cached session for `credential`, creating it if needed.
    ///
    /// Provider errors are returned unchanged and leave the cache untouched.
    pub fn get_or_create(&self, credential: &str) -> lyra_ai::Result<SessionHandle> {
        let mut slot = self.slot.lock();

        if let Some((cached, handle)) = slot.as_ref() {
            if cached == credential {
                return Ok(Arc::clone(handle));
            }
        }

        let handle = self.provider.start_chat(credential, &self.config)?;
        if slot.is_some() {
            tracing::debug!("credential changed, replacing chat session");
        }
        tracing::debug!(model = %self.config.model, "created chat session");

        *slot = Some((credential.to_string(), Arc::clone(&handle)));
        Ok(handle)
    }

    /// Discard the cached session; the next request starts a fresh one
    pub fn reset(&self) {
        if self.slot.lock().take().is_some() {
            tracing::debug!("chat session reset");
        }
    }

    /// Whether a session for exactly this credential is cached
    pub fn is_cached(&self, credential: &str) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|(cached, _)| cached == credential)
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("config", &self.config)
            .field("cached", &self.slot.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lyra_ai::{Error, StreamEventStream};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct NullSession;

    #[async_trait]
    impl ChatSession for NullSession {
        async fn send_message_stream(&self, _message: &str) -> lyra_ai::Result<StreamEventStream> {
            Ok(Box::pin(futures::stream::empty()))
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        created: AtomicU32,
    }

    impl SessionProvider for CountingProvider {
        fn start_chat(&self, api_key: &str, _config: &ChatConfig) -> lyra_ai::Result<SessionHandle> {
            if api_key.is_empty() {
                return Err(Error::InvalidApiKey);
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullSession))
        }
    }

    fn cache() -> (Arc<CountingProvider>, SessionCache) {
        let provider = Arc::new(CountingProvider::default());
        let cache = SessionCache::new(provider.clone(), ChatConfig::default());
        (provider, cache)
    }

    #[test]
    fn test_same_credential_returns_same_handle() {
        let (provider, cache) = cache();
        let a = cache.get_or_create("k1").unwrap();
        let b = cache.get_or_create("k1").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(provider.created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_new_credential_replaces_handle() {
        let (provider, cache) = cache();
        let a = cache.get_or_create("k1").unwrap();
        let b = cache.get_or_create("k2").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(cache.is_cached("k2"));
        assert!(!cache.is_cached("k1"));

        // Going back to k1 builds yet another session
        let c = cache.get_or_create("k1").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(provider.created.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_reset_discards_handle() {
        let (_, cache) = cache();
        let a = cache.get_or_create("k1").unwrap();
        cache.reset();
        assert!(!cache.is_cached("k1"));
        let b = cache.get_or_create("k1").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_provider_error_propagates_and_keeps_cache() {
        let (_, cache) = cache();
        cache.get_or_create("k1").unwrap();
        assert!(matches!(cache.get_or_create(""), Err(Error::InvalidApiKey)));
        assert!(cache.is_cached("k1"));
    }
}
