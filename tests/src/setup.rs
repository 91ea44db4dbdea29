//! Common test setup functions.

use api::nonce::SUBMIT_ACTION;
use api::{router, ApiConfig, AppState, NonceGuard, SubmissionHandler};
use axum::extract::connect_info::MockConnectInfo;
use axum::Router;
use delivery::{SharedNotifier, SharedRepository};
use intake_core::{
    FieldConfigResolver, FormValidator, HeuristicResolver, Sanitizer, Submission,
    ValidationConfig,
};
use std::net::SocketAddr;
use std::sync::Arc;
use throttle::{ManualClock, MemoryStore, Throttle, ThrottleConfig};

use crate::mocks::{MockNotifier, MockRepository};

/// Public address the test server sees as the connecting peer.
pub const CLIENT_ADDR: &str = "8.8.8.8:40000";

/// Starting time of the shared manual clock.
pub const START_TIME: i64 = 1_700_000_000;

/// Knobs for building a [`TestContext`].
#[derive(Clone)]
pub struct TestConfig {
    pub validation: ValidationConfig,
    pub throttle: ThrottleConfig,
    pub api: ApiConfig,
    pub remote_addr: SocketAddr,
    pub check: Option<fn(&Submission) -> Result<(), String>>,
}

impl Default for TestConfig {
    fn default() -> Self {
        let mut api = ApiConfig::default();
        api.security.nonce_secret = "test-nonce-secret".to_string();

        let throttle = ThrottleConfig {
            secret: "test-throttle-secret".to_string(),
            ..ThrottleConfig::default()
        };

        Self {
            validation: ValidationConfig::default(),
            throttle,
            api,
            remote_addr: parse_addr(CLIENT_ADDR),
            check: None,
        }
    }
}

/// Test context wired exactly like `main`, with mocked storage and notification.
///
/// - Uses the real Axum router with all layers
/// - Uses `MockRepository` and `MockNotifier` behind the production traits
/// - Drives the throttle and form tokens from one manual clock
pub struct TestContext {
    pub router: Router,
    pub repository: Arc<MockRepository>,
    pub notifier: Arc<MockNotifier>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub nonce: Arc<NonceGuard>,
}

impl TestContext {
    /// Create a context with default settings.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(config: TestConfig) -> Self {
        let clock = Arc::new(ManualClock::new(START_TIME));

        let resolver: Arc<dyn FieldConfigResolver> =
            Arc::new(HeuristicResolver::new(&config.validation.fields));
        let sanitizer = Sanitizer::new(
            resolver.clone(),
            config.validation.types.allowed_url_schemes.clone(),
        );
        let mut validator = FormValidator::with_resolver(config.validation.clone(), resolver);
        if let Some(check) = config.check {
            validator = validator.with_check(check);
        }

        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let throttle = Arc::new(Throttle::new(
            config.throttle.clone(),
            store.clone(),
            clock.clone(),
        ));

        let repository = Arc::new(MockRepository::new());
        let notifier = Arc::new(MockNotifier::new());

        let handler = SubmissionHandler::new(
            validator,
            sanitizer,
            throttle,
            repository.clone() as SharedRepository,
            notifier.clone() as SharedNotifier,
        );

        let nonce = NonceGuard::with_clock(
            config.api.security.nonce_secret.clone(),
            config.api.security.nonce_lifetime_secs,
            clock.clone(),
        );
        let state = AppState::with_nonce(handler, store.clone(), config.api.clone(), nonce);
        let nonce = state.nonce.clone();

        let router = router(state).layer(MockConnectInfo(config.remote_addr));

        Self {
            router,
            repository,
            notifier,
            store,
            clock,
            nonce,
        }
    }

    /// A valid form token for the submit endpoint.
    pub fn token(&self) -> String {
        self.nonce.create(SUBMIT_ACTION)
    }

    /// Move the shared clock forward.
    pub fn advance(&self, secs: i64) {
        self.clock.advance(secs);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_addr(addr: &str) -> SocketAddr {
    addr.parse().expect("valid socket address")
}
