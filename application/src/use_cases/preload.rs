//! Ensure-initialized model backend.
//!
//! Loading a model is expensive, so the process keeps one gateway and
//! shares it between sessions. [`BackendCell`] creates it at most once,
//! using double-checked locking: a lock-free read of the initialized value,
//! then an async mutex, a second check, and only then the factory.
//!
//! [`PreloadedGateway`] is an [`LlmGateway`] that resolves its backend
//! through the cell on every request, so the first request and a background
//! warm-up can race without loading the model twice.

use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use toolgate_domain::{GenerationOptions, Message};
use tracing::{debug, info};

/// Creates the backend on first use
pub type GatewayFactory =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn LlmGateway>, GatewayError>> + Send + Sync>;

/// Wrap an async constructor as a [`GatewayFactory`]
pub fn gateway_factory<F, Fut>(make: F) -> GatewayFactory
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn LlmGateway>, GatewayError>> + Send + 'static,
{
    Arc::new(move || Box::pin(make()) as BoxFuture<'static, _>)
}

/// One-time initialization slot for the shared backend
#[derive(Default)]
pub struct BackendCell {
    gateway: OnceLock<Arc<dyn LlmGateway>>,
    init_lock: Mutex<()>,
}

impl BackendCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backend, if it has been initialized
    pub fn get(&self) -> Option<Arc<dyn LlmGateway>> {
        self.gateway.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.gateway.get().is_some()
    }

    /// Return the shared backend, running `factory` if nobody has yet.
    ///
    /// Concurrent first calls run the factory exactly once. A failing
    /// factory leaves the cell empty so a later call can retry.
    pub async fn ensure_initialized<F, Fut>(
        &self,
        factory: F,
    ) -> Result<Arc<dyn LlmGateway>, GatewayError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<dyn LlmGateway>, GatewayError>>,
    {
        if let Some(gateway) = self.gateway.get() {
            return Ok(gateway.clone());
        }

        let _guard = self.init_lock.lock().await;
        if let Some(gateway) = self.gateway.get() {
            debug!("Backend initialized while waiting for the lock");
            return Ok(gateway.clone());
        }

        let gateway = factory().await?;
        info!(model = gateway.model_name(), "Backend initialized");
        // only writer: the init lock is held
        let _ = self.gateway.set(gateway.clone());
        Ok(gateway)
    }
}

/// Gateway that initializes the shared backend on first use
pub struct PreloadedGateway {
    cell: Arc<BackendCell>,
    factory: GatewayFactory,
    model_name: String,
}

impl PreloadedGateway {
    pub fn new(cell: Arc<BackendCell>, model_name: impl Into<String>, factory: GatewayFactory) -> Self {
        Self {
            cell,
            factory,
            model_name: model_name.into(),
        }
    }

    async fn backend(&self) -> Result<Arc<dyn LlmGateway>, GatewayError> {
        let factory = self.factory.clone();
        self.cell.ensure_initialized(move || factory()).await
    }
}

#[async_trait]
impl LlmGateway for PreloadedGateway {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<String, GatewayError> {
        self.backend().await?.complete(messages, options).await
    }

    async fn complete_streaming(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<StreamHandle, GatewayError> {
        self.backend().await?.complete_streaming(messages, options).await
    }

    /// Initializing the cell is the warm-up; the factory decides whether
    /// that includes loading the model.
    async fn warm_up(&self) -> Result<(), GatewayError> {
        self.backend().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedGateway(&'static str);

    #[async_trait]
    impl LlmGateway for FixedGateway {
        fn model_name(&self) -> &str {
            "fixed"
        }

        async fn complete(
            &self,
            _messages: &[Message],
            _options: &GenerationOptions,
        ) -> Result<String, GatewayError> {
            Ok(self.0.to_string())
        }
    }

    fn counting_factory(counter: Arc<AtomicUsize>) -> GatewayFactory {
        gateway_factory(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, GatewayError>(Arc::new(FixedGateway("ready")) as Arc<dyn LlmGateway>)
            }
        })
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_initialize_once() {
        let cell = Arc::new(BackendCell::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let factory = counting_factory(counter.clone());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cell = cell.clone();
            let factory = factory.clone();
            handles.push(tokio::spawn(async move {
                cell.ensure_initialized(move || factory()).await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(cell.is_initialized());
    }

    #[tokio::test]
    async fn test_failed_factory_can_be_retried() {
        let cell = BackendCell::new();

        let err = cell
            .ensure_initialized(|| async { Err(GatewayError::ConnectionError("down".into())) })
            .await
            .err()
            .unwrap();
        assert_eq!(err, GatewayError::ConnectionError("down".into()));
        assert!(!cell.is_initialized());

        let gateway = cell
            .ensure_initialized(|| async {
                Ok(Arc::new(FixedGateway("up")) as Arc<dyn LlmGateway>)
            })
            .await
            .unwrap();
        assert_eq!(gateway.model_name(), "fixed");
        assert!(cell.get().is_some());
    }

    #[tokio::test]
    async fn test_preloaded_gateway_shares_backend() {
        let cell = Arc::new(BackendCell::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let gateway = PreloadedGateway::new(cell.clone(), "qwen3", counting_factory(counter.clone()));

        gateway.warm_up().await.unwrap();
        let reply = gateway
            .complete(&[Message::user("hi")], &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(reply, "ready");
        assert_eq!(gateway.model_name(), "qwen3");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
