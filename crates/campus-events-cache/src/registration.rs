//! Generation lifecycle: install, waiting, activation and page notification.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info};

use crate::config::CacheConfig;
use crate::controller::CacheController;
use crate::error::CacheResult;
use crate::network::Network;
use crate::request::{Request, Response};
use crate::storage::CacheStorage;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Messages a page posts to the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate the waiting generation now.
    SkipWaiting,
}

impl ControlMessage {
    /// Decodes a message such as `{"type":"SKIP_WAITING"}`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidMessage`](crate::CacheError::InvalidMessage)
    /// for unknown or malformed messages.
    pub fn parse(json: &str) -> CacheResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Notifications delivered to pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UpdateEvent {
    /// A new generation is installed and waiting.
    UpdateAvailable { version: String },
    /// A generation took control; pages should reload.
    ControllerChanged { version: String },
}

/// What [`Registration::register`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The generation was installed and activated.
    Activated { version: String, deleted: Vec<String> },
    /// The generation was installed and waits for a skip-waiting message.
    Waiting { version: String },
    /// The generation is already active or waiting.
    Unchanged { version: String },
}

#[derive(Debug, Default)]
struct Generations {
    active: Option<Arc<CacheController>>,
    waiting: Option<Arc<CacheController>>,
}

/// The registration of the cache controller for one site.
pub struct Registration {
    storage: CacheStorage,
    network: Arc<dyn Network>,
    generations: RwLock<Generations>,
    /// Serializes activations; never held by intercepted requests.
    promotion: Mutex<()>,
    events: broadcast::Sender<UpdateEvent>,
    skip_waiting_on_install: bool,
}

impl Registration {
    pub fn new(storage: CacheStorage, network: Arc<dyn Network>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            network,
            generations: RwLock::new(Generations::default()),
            promotion: Mutex::new(()),
            events,
            skip_waiting_on_install: false,
        }
    }

    /// Builder: activate new generations right after install.
    pub fn with_skip_waiting_on_install(mut self, skip: bool) -> Self {
        self.skip_waiting_on_install = skip;
        self
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Subscribes to update notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.events.subscribe()
    }

    pub async fn active_version(&self) -> Option<String> {
        let generations = self.generations.read().await;
        generations.active.as_ref().map(|c| c.version().to_string())
    }

    pub async fn waiting_version(&self) -> Option<String> {
        let generations = self.generations.read().await;
        generations.waiting.as_ref().map(|c| c.version().to_string())
    }

    /// Registers a generation.
    ///
    /// The first generation activates at once. A later one waits while a
    /// controller is active. A failed install leaves the current generations
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the install fails.
    pub async fn register(&self, config: CacheConfig) -> CacheResult<RegisterOutcome> {
        let version = config.version.clone();
        {
            let generations = self.generations.read().await;
            if generations.active.as_ref().is_some_and(|c| c.version() == version)
                || generations.waiting.as_ref().is_some_and(|c| c.version() == version)
            {
                debug!(version = %version, "Generation already registered");
                return Ok(RegisterOutcome::Unchanged { version });
            }
        }

        let controller = Arc::new(CacheController::new(
            config,
            self.storage.clone(),
            Arc::clone(&self.network),
        )?);
        controller.install().await?;

        let _promotion = self.promotion.lock().await;
        {
            let mut generations = self.generations.write().await;
            if generations.active.is_some() && !self.skip_waiting_on_install {
                if let Some(previous) = generations.waiting.replace(controller) {
                    debug!(version = previous.version(), "Replaced waiting generation");
                }
            } else {
                generations.waiting = None;
                drop(generations);
                let deleted = self.promote(controller).await;
                return Ok(RegisterOutcome::Activated { version, deleted });
            }
        }
        info!(version = %version, "New generation waiting");
        self.notify(UpdateEvent::UpdateAvailable {
            version: version.clone(),
        });
        Ok(RegisterOutcome::Waiting { version })
    }

    /// Handles a message posted by a page.
    ///
    /// Returns the version that took control, if any.
    pub async fn post_message(&self, message: ControlMessage) -> Option<String> {
        match message {
            ControlMessage::SkipWaiting => {
                let _promotion = self.promotion.lock().await;
                let Some(waiting) = self.generations.write().await.waiting.take() else {
                    debug!("Skip waiting without a waiting generation");
                    return None;
                };
                let version = waiting.version().to_string();
                self.promote(waiting).await;
                Some(version)
            }
        }
    }

    /// Routes a request through the active controller.
    ///
    /// Returns `None` when no controller is active or the controller lets the
    /// request through.
    pub async fn handle_fetch(&self, request: &Request) -> Option<Response> {
        let active = self.active().await?;
        active.handle_fetch(request).await
    }

    /// Waits for pending cache writes of the active controller.
    pub async fn settle(&self) {
        if let Some(active) = self.active().await {
            active.settle().await;
        }
    }

    async fn active(&self) -> Option<Arc<CacheController>> {
        self.generations.read().await.active.clone()
    }

    /// Makes `controller` the active generation. Callers hold `promotion`.
    async fn promote(&self, controller: Arc<CacheController>) -> Vec<String> {
        let old = self
            .generations
            .write()
            .await
            .active
            .replace(Arc::clone(&controller));

        // Old writes must land before their cache is deleted.
        if let Some(old) = old {
            old.retire();
            old.settle().await;
        }
        let deleted = controller.activate().await;
        let version = controller.version().to_string();
        info!(version = %version, "Controller changed");
        self.notify(UpdateEvent::ControllerChanged { version });
        deleted
    }

    fn notify(&self, event: UpdateEvent) {
        if self.events.send(event).is_err() {
            debug!("No page is listening for update events");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::network::MemoryNetwork;

    const ORIGIN: &str = "http://localhost:8080/";
    const PATHS: [&str; 3] = ["./", "./index.html", "./css/style.css"];

    fn url(path: &str) -> String {
        format!("{ORIGIN}{}", path.trim_start_matches("./"))
    }

    fn config(version: &str) -> CacheConfig {
        CacheConfig::new(ORIGIN)
            .with_version(version)
            .with_manifest(PATHS)
    }

    async fn publish(network: &MemoryNetwork, tag: &str) {
        for path in PATHS {
            network
                .route(&url(path), Response::ok("text/html", format!("{path} {tag}")))
                .await;
        }
    }

    async fn setup() -> (Registration, MemoryNetwork) {
        let network = MemoryNetwork::new();
        publish(&network, "v1").await;
        let registration = Registration::new(CacheStorage::new(), Arc::new(network.clone()));
        (registration, network)
    }

    async fn page(registration: &Registration) -> String {
        let response = registration
            .handle_fetch(&Request::navigate(&url("./index.html")).unwrap())
            .await
            .unwrap();
        response.text().into_owned()
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn first_generation_activates() {
            let (registration, _) = setup().await;
            let mut events = registration.subscribe();

            let outcome = registration.register(config("1")).await.unwrap();
            assert_eq!(
                outcome,
                RegisterOutcome::Activated {
                    version: "1".into(),
                    deleted: vec![],
                }
            );
            assert_eq!(
                events.recv().await.unwrap(),
                UpdateEvent::ControllerChanged {
                    version: "1".into()
                }
            );
            assert_eq!(registration.active_version().await.as_deref(), Some("1"));
            assert_eq!(page(&registration).await, "./index.html v1");
        }

        #[tokio::test]
        async fn same_version_is_unchanged() {
            let (registration, network) = setup().await;
            registration.register(config("1")).await.unwrap();
            let before = network.request_count();

            let outcome = registration.register(config("1")).await.unwrap();
            assert_eq!(outcome, RegisterOutcome::Unchanged { version: "1".into() });
            assert_eq!(network.request_count(), before);
        }

        #[tokio::test]
        async fn new_generation_waits_until_skip_waiting() {
            let (registration, network) = setup().await;
            registration.register(config("1")).await.unwrap();
            let mut events = registration.subscribe();

            publish(&network, "v2").await;
            let outcome = registration.register(config("2")).await.unwrap();
            assert_eq!(outcome, RegisterOutcome::Waiting { version: "2".into() });
            assert_eq!(
                events.recv().await.unwrap(),
                UpdateEvent::UpdateAvailable {
                    version: "2".into()
                }
            );
            assert_eq!(registration.waiting_version().await.as_deref(), Some("2"));
            assert_eq!(page(&registration).await, "./index.html v1");

            let message = ControlMessage::parse(r#"{"type":"SKIP_WAITING"}"#).unwrap();
            assert_eq!(registration.post_message(message).await.as_deref(), Some("2"));
            assert_eq!(
                events.recv().await.unwrap(),
                UpdateEvent::ControllerChanged {
                    version: "2".into()
                }
            );
            assert_eq!(registration.waiting_version().await, None);
            assert_eq!(registration.storage().keys().await, vec!["clark-events-v2"]);
            assert_eq!(page(&registration).await, "./index.html v2");
        }

        #[tokio::test]
        async fn skip_waiting_without_waiting_generation() {
            let (registration, _) = setup().await;
            registration.register(config("1")).await.unwrap();
            assert_eq!(registration.post_message(ControlMessage::SkipWaiting).await, None);
            assert_eq!(registration.active_version().await.as_deref(), Some("1"));
        }

        #[tokio::test]
        async fn failed_install_keeps_previous_generation() {
            let (registration, network) = setup().await;
            registration.register(config("1")).await.unwrap();

            network.unroute(&url("./css/style.css")).await;
            let err = registration.register(config("2")).await.unwrap_err();
            assert!(matches!(err, CacheError::Install(_)));

            assert_eq!(registration.active_version().await.as_deref(), Some("1"));
            assert_eq!(registration.waiting_version().await, None);
            assert_eq!(registration.storage().keys().await, vec!["clark-events-v1"]);
        }

        #[tokio::test]
        async fn skip_waiting_on_install_activates_immediately() {
            let (registration, network) = setup().await;
            let registration = registration.with_skip_waiting_on_install(true);
            registration.register(config("1")).await.unwrap();

            publish(&network, "v2").await;
            let outcome = registration.register(config("2")).await.unwrap();
            assert_eq!(
                outcome,
                RegisterOutcome::Activated {
                    version: "2".into(),
                    deleted: vec!["clark-events-v1".into()],
                }
            );
        }

        #[tokio::test]
        async fn no_active_controller_passes_through() {
            let (registration, _) = setup().await;
            let request = Request::navigate(&url("./")).unwrap();
            assert!(registration.handle_fetch(&request).await.is_none());
        }
    }

    mod concurrency {
        use super::*;
        use std::time::Duration;

        use crate::error::NetworkError;
        use crate::network::BoxFuture;

        /// Delays every request for one URL.
        struct SlowNetwork {
            inner: MemoryNetwork,
            slow_url: String,
            delay: Duration,
        }

        impl Network for SlowNetwork {
            fn fetch<'a>(
                &'a self,
                request: &'a Request,
            ) -> BoxFuture<'a, Result<Response, NetworkError>> {
                Box::pin(async move {
                    if request.url.as_str() == self.slow_url {
                        tokio::time::sleep(self.delay).await;
                    }
                    self.inner.fetch(request).await
                })
            }
        }

        #[tokio::test(start_paused = true)]
        async fn slow_fetch_does_not_block_cached_pages_during_switch() {
            let inner = MemoryNetwork::new();
            publish(&inner, "v1").await;
            let slow_url = url("./css/style.css");
            let network = SlowNetwork {
                inner: inner.clone(),
                slow_url: slow_url.clone(),
                delay: Duration::from_secs(3),
            };
            let registration = Arc::new(Registration::new(CacheStorage::new(), Arc::new(network)));

            // Installs fetch the slow asset too; let the clock run through them.
            registration.register(config("1")).await.unwrap();
            publish(&inner, "v2").await;
            registration.register(config("2")).await.unwrap();
            assert_eq!(registration.waiting_version().await.as_deref(), Some("2"));

            let slow = tokio::spawn({
                let registration = Arc::clone(&registration);
                let request = Request::get(&slow_url).unwrap();
                async move { registration.handle_fetch(&request).await }
            });
            tokio::task::yield_now().await;
            let switch = tokio::spawn({
                let registration = Arc::clone(&registration);
                async move { registration.post_message(ControlMessage::SkipWaiting).await }
            });
            tokio::task::yield_now().await;

            let navigation = Request::navigate(&url("./index.html")).unwrap();
            let response = tokio::time::timeout(
                Duration::from_millis(100),
                registration.handle_fetch(&navigation),
            )
            .await
            .expect("cached page must not wait for the slow fetch")
            .unwrap();
            assert_eq!(response.status, 200);

            assert_eq!(switch.await.unwrap().as_deref(), Some("2"));
            assert_eq!(slow.await.unwrap().unwrap().status, 200);
            registration.settle().await;
            // The retired generation never recreates its deleted cache.
            assert_eq!(registration.storage().keys().await, vec!["clark-events-v2"]);
        }
    }

    mod messages {
        use super::*;

        #[test]
        fn control_message_wire_format() {
            assert_eq!(
                serde_json::to_string(&ControlMessage::SkipWaiting).unwrap(),
                r#"{"type":"SKIP_WAITING"}"#
            );
            assert!(matches!(
                ControlMessage::parse(r#"{"type":"RELOAD"}"#),
                Err(CacheError::InvalidMessage(_))
            ));
        }

        #[test]
        fn update_event_wire_format() {
            let event = UpdateEvent::UpdateAvailable {
                version: "2.1.3".into(),
            };
            assert_eq!(
                serde_json::to_string(&event).unwrap(),
                r#"{"event":"update_available","version":"2.1.3"}"#
            );
        }
    }
}
