//! Composition root
//!
//! [`App`] wires the services, the router and the navigation host together
//! and picks the first screen from the restored auth state.

use crate::config::AppConfig;
use crate::telemetry::init_tracing;
use app_core::auth::{AuthBackend, AuthManager, AuthState};
use app_core::movies::MovieCatalog;
use app_ui::host::{HostedScreen, InMemoryHost, NavigationHost};
use app_ui::navigation::Router;
use app_ui::screens::{register_root_destinations, RootDestination, ScreenContext, SplashScreen};
use networking::client::HttpError;
use networking::firebase::FirebaseAuth;
use networking::tmdb::TmdbCatalog;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

/// Application setup errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// A service client could not be built
    #[error("Failed to build service client: {0}")]
    Client(#[from] HttpError),
}

/// The running application
///
/// # Example
///
/// ```
/// use app_core::test_utils::{InMemoryAuthBackend, StaticCatalog};
/// use app_ui::screens::WelcomeScreen;
/// use cinema_db::app::App;
/// use cinema_db::config::AppConfig;
/// use std::sync::Arc;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let app = App::with_services(
///         &AppConfig::default(),
///         Arc::new(InMemoryAuthBackend::new()),
///         Arc::new(StaticCatalog::generated(1, 5)),
///     );
///     app.launch().await;
///
///     assert!(app.top().unwrap().is::<WelcomeScreen>());
/// }
/// ```
pub struct App {
    host: Rc<RefCell<InMemoryHost>>,
    router: Rc<Router>,
    context: ScreenContext,
    auth: Arc<AuthManager>,
}

impl App {
    /// Build the application with the TMDB and Firebase clients
    ///
    /// Installs the global log subscriber with `config.log_filter` unless
    /// one is already installed.
    ///
    /// # Errors
    ///
    /// - `AppError::Client` - An HTTP client could not be built
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        init_tracing(&config.log_filter);
        let backend = Arc::new(FirebaseAuth::new(config.firebase_config())?);
        let catalog = Arc::new(TmdbCatalog::new(config.tmdb_config())?);
        Ok(Self::with_services(config, backend, catalog))
    }

    /// Build the application over the given services
    pub fn with_services(
        config: &AppConfig,
        backend: Arc<dyn AuthBackend>,
        catalog: Arc<dyn MovieCatalog>,
    ) -> Self {
        let host = Rc::new(RefCell::new(InMemoryHost::new(HostedScreen::new(SplashScreen))));
        let router = Rc::new(Router::with_config(config.router_config()));
        router.attach(&host);

        let auth = Arc::new(AuthManager::new(backend));
        let context = ScreenContext::new(&router, auth.clone(), catalog)
            .with_image_base_url(config.catalog.image_base_url.clone());
        register_root_destinations(&context);

        Self {
            host,
            router,
            context,
            auth,
        }
    }

    /// Restore the session and replace the splash screen
    ///
    /// Welcome when signed out, Home otherwise.
    pub async fn launch(&self) -> AuthState {
        let state = self.auth.restore().await;
        let destination = RootDestination::for_state(state);
        tracing::info!("Launching into {:?} ({:?})", destination, state);
        self.router.push_value(destination, true);
        state
    }

    /// Navigation host
    pub fn host(&self) -> Ref<'_, InMemoryHost> {
        self.host.borrow()
    }

    /// Shared host handle
    pub fn host_handle(&self) -> Rc<RefCell<InMemoryHost>> {
        self.host.clone()
    }

    /// Router
    pub fn router(&self) -> &Rc<Router> {
        &self.router
    }

    /// Services shared by the screens
    pub fn context(&self) -> &ScreenContext {
        &self.context
    }

    /// Authentication manager
    pub fn auth(&self) -> &Arc<AuthManager> {
        &self.auth
    }

    /// Visible screen
    pub fn top(&self) -> Option<HostedScreen> {
        self.host.borrow().top()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("depth", &self.router.depth())
            .field("state", &self.auth.state())
            .finish_non_exhaustive()
    }
}
