//! Application screens
//!
//! Thin screen models: they hold form and feed state, call the services in
//! [`ScreenContext`], and navigate through the router on success. Service
//! failures are logged and leave the stack untouched.

use crate::forms::{
    LoginField, LoginForm, RegistrationField, RegistrationForm, ReturnKeyAction,
};
use crate::host::{HostedScreen, Screen};
use crate::navigation::{NavigationLink, Router};
use app_core::auth::{AuthError, AuthManager, AuthState};
use app_core::movies::{CatalogError, Movie, MovieCatalog, MovieDetails, MovieFeed};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Default base URL for poster images
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Title of the home screen
pub const HOME_TITLE: &str = "Cinema DB";

// =============================================================================
// Context
// =============================================================================

/// Services shared by every screen
///
/// The router is held weakly: resolvers registered on the router capture
/// a context, and a strong reference would keep the router alive forever.
#[derive(Clone)]
pub struct ScreenContext {
    router: Weak<Router>,
    /// Authentication
    pub auth: Arc<AuthManager>,
    /// Movie catalog
    pub catalog: Arc<dyn MovieCatalog>,
    /// Base URL poster paths are appended to
    pub image_base_url: String,
}

impl ScreenContext {
    /// Create a context
    pub fn new(router: &Rc<Router>, auth: Arc<AuthManager>, catalog: Arc<dyn MovieCatalog>) -> Self {
        Self {
            router: Rc::downgrade(router),
            auth,
            catalog,
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
        }
    }

    /// Set the poster base URL
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = url.into();
        self
    }

    /// The router, while the application is alive
    pub fn router(&self) -> Option<Rc<Router>> {
        self.router.upgrade()
    }

    /// Run `f` against the router; false when it is gone
    pub fn navigate(&self, f: impl FnOnce(&Router) -> bool) -> bool {
        match self.router() {
            Some(router) => f(&router),
            None => {
                tracing::warn!("Navigation requested after the router was dropped");
                false
            }
        }
    }
}

impl std::fmt::Debug for ScreenContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenContext")
            .field("image_base_url", &self.image_base_url)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Root destinations
// =============================================================================

/// Top-level destinations chosen from the auth state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootDestination {
    /// Signed-out entry point
    Welcome,
    /// Movie list
    Home,
}

impl RootDestination {
    /// Destination for an auth state
    pub fn for_state(state: AuthState) -> Self {
        if state.has_user() {
            RootDestination::Home
        } else {
            RootDestination::Welcome
        }
    }
}

/// Register the [`RootDestination`] resolver on the context's router
pub fn register_root_destinations(ctx: &ScreenContext) {
    let Some(router) = ctx.router() else {
        return;
    };
    let resolver_ctx = ctx.clone();
    router.navigation_destination(move |destination: &RootDestination| match destination {
        RootDestination::Welcome => HostedScreen::new(WelcomeScreen::new(&resolver_ctx)),
        RootDestination::Home => HostedScreen::new(HomeScreen::new(&resolver_ctx)),
    });
}

// =============================================================================
// Splash
// =============================================================================

/// Launch screen shown until the auth state is known
#[derive(Debug, Default)]
pub struct SplashScreen;

impl Screen for SplashScreen {}

// =============================================================================
// Welcome
// =============================================================================

/// Signed-out entry point with links to login and registration
#[derive(Debug)]
pub struct WelcomeScreen {
    login: NavigationLink,
    register: NavigationLink,
    ctx: ScreenContext,
}

impl WelcomeScreen {
    /// Heading text
    pub const HEADING: &'static str = "Welcome to Cinema DB";

    /// Create the screen
    pub fn new(ctx: &ScreenContext) -> Self {
        let login_ctx = ctx.clone();
        let register_ctx = ctx.clone();
        Self {
            login: NavigationLink::to_screen("Log In", move || LoginScreen::new(&login_ctx)),
            register: NavigationLink::to_screen("Register", move || {
                RegistrationScreen::new(&register_ctx)
            }),
            ctx: ctx.clone(),
        }
    }

    /// Links in display order
    pub fn links(&self) -> [&NavigationLink; 2] {
        [&self.login, &self.register]
    }

    /// Open the login screen
    pub fn open_login(&self) -> bool {
        self.ctx.navigate(|router| self.login.tap(router))
    }

    /// Open the registration screen
    pub fn open_registration(&self) -> bool {
        self.ctx.navigate(|router| self.register.tap(router))
    }
}

impl Screen for WelcomeScreen {
    fn hides_navigation_bar(&self) -> Option<bool> {
        Some(true)
    }
}

// =============================================================================
// Login
// =============================================================================

/// Email and password sign-in
#[derive(Debug)]
pub struct LoginScreen {
    ctx: ScreenContext,
    form: RefCell<LoginForm>,
    last_error: RefCell<Option<AuthError>>,
}

impl LoginScreen {
    /// Create the screen
    pub fn new(ctx: &ScreenContext) -> Self {
        Self {
            ctx: ctx.clone(),
            form: RefCell::new(LoginForm::new()),
            last_error: RefCell::new(None),
        }
    }

    /// Form state
    pub fn form(&self) -> Ref<'_, LoginForm> {
        self.form.borrow()
    }

    /// Mutable form state
    pub fn form_mut(&self) -> RefMut<'_, LoginForm> {
        self.form.borrow_mut()
    }

    /// Error from the last sign-in attempt
    pub fn last_error(&self) -> Option<AuthError> {
        self.last_error.borrow().clone()
    }

    /// Return key on `field`; submits from the last field
    pub async fn return_key(&self, field: LoginField) -> bool {
        let action = self.form.borrow_mut().return_key(field);
        match action {
            ReturnKeyAction::Focus(_) => false,
            ReturnKeyAction::Submit => self.submit().await,
        }
    }

    /// Validate and sign in; on success the stack becomes Home
    pub async fn submit(&self) -> bool {
        let credentials = self.form.borrow_mut().validate();
        let Some(credentials) = credentials else {
            return false;
        };

        match self
            .ctx
            .auth
            .sign_in(&credentials.email, &credentials.password)
            .await
        {
            Ok(_) => {
                self.last_error.replace(None);
                self.ctx
                    .navigate(|router| router.push_value(RootDestination::Home, true))
            }
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                self.last_error.replace(Some(e));
                false
            }
        }
    }
}

impl Screen for LoginScreen {
    fn title(&self) -> Option<String> {
        Some("Log In".to_string())
    }

    fn hides_navigation_bar(&self) -> Option<bool> {
        Some(false)
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Account creation
#[derive(Debug)]
pub struct RegistrationScreen {
    ctx: ScreenContext,
    form: RefCell<RegistrationForm>,
    last_error: RefCell<Option<AuthError>>,
}

impl RegistrationScreen {
    /// Create the screen
    pub fn new(ctx: &ScreenContext) -> Self {
        Self {
            ctx: ctx.clone(),
            form: RefCell::new(RegistrationForm::new()),
            last_error: RefCell::new(None),
        }
    }

    /// Form state
    pub fn form(&self) -> Ref<'_, RegistrationForm> {
        self.form.borrow()
    }

    /// Mutable form state
    pub fn form_mut(&self) -> RefMut<'_, RegistrationForm> {
        self.form.borrow_mut()
    }

    /// Error from the last sign-up attempt
    pub fn last_error(&self) -> Option<AuthError> {
        self.last_error.borrow().clone()
    }

    /// Return key on `field`; submits from the last field
    pub async fn return_key(&self, field: RegistrationField) -> bool {
        let action = self.form.borrow_mut().return_key(field);
        match action {
            ReturnKeyAction::Focus(_) => false,
            ReturnKeyAction::Submit => self.submit().await,
        }
    }

    /// Validate and create the account; on success the stack becomes Home
    pub async fn submit(&self) -> bool {
        let credentials = self.form.borrow_mut().validate();
        let Some(credentials) = credentials else {
            return false;
        };

        match self
            .ctx
            .auth
            .sign_up(&credentials.email, &credentials.password)
            .await
        {
            Ok(_) => {
                self.last_error.replace(None);
                self.ctx
                    .navigate(|router| router.push_value(RootDestination::Home, true))
            }
            Err(e) => {
                tracing::warn!("Registration failed: {}", e);
                self.last_error.replace(Some(e));
                false
            }
        }
    }
}

impl Screen for RegistrationScreen {
    fn title(&self) -> Option<String> {
        Some("Registration".to_string())
    }

    fn hides_navigation_bar(&self) -> Option<bool> {
        Some(false)
    }
}

// =============================================================================
// Home
// =============================================================================

/// Paginated movie list
#[derive(Debug)]
pub struct HomeScreen {
    ctx: ScreenContext,
    feed: RefCell<MovieFeed>,
}

impl HomeScreen {
    /// Create the screen
    pub fn new(ctx: &ScreenContext) -> Self {
        Self {
            ctx: ctx.clone(),
            feed: RefCell::new(MovieFeed::new()),
        }
    }

    /// Movies loaded so far
    pub fn movies(&self) -> Vec<Movie> {
        self.feed.borrow().movies().to_vec()
    }

    /// Feed state
    pub fn feed(&self) -> Ref<'_, MovieFeed> {
        self.feed.borrow()
    }

    /// Poster URL of a listed movie
    pub fn poster_url(&self, movie: &Movie) -> Option<String> {
        movie.poster_url(&self.ctx.image_base_url)
    }

    /// Load the first page when nothing is loaded yet
    pub async fn appear(&self) -> Result<usize, CatalogError> {
        if self.feed.borrow().page() > 0 {
            return Ok(0);
        }
        self.load_next_page().await
    }

    /// The movie at `index` became visible; loads more at the end of the list
    pub async fn item_appeared(&self, index: usize) -> Result<usize, CatalogError> {
        if !self.feed.borrow().should_load_more(index) {
            return Ok(0);
        }
        self.load_next_page().await
    }

    /// Open the details of a movie
    pub fn open_details(&self, movie: &Movie) -> bool {
        let details = DetailsScreen::new(&self.ctx, movie.clone());
        self.ctx.navigate(|router| router.push(details, false))
    }

    /// Sign out; on success the stack becomes Welcome
    pub async fn sign_out(&self) -> bool {
        match self.ctx.auth.sign_out().await {
            Ok(()) => self
                .ctx
                .navigate(|router| router.push_value(RootDestination::Welcome, true)),
            Err(e) => {
                tracing::error!("Sign out failed: {}", e);
                false
            }
        }
    }

    async fn load_next_page(&self) -> Result<usize, CatalogError> {
        let page = self.feed.borrow_mut().begin_load();
        let Some(page) = page else {
            return Ok(0);
        };
        let result = self.ctx.catalog.fetch_movies(page).await;
        self.feed.borrow_mut().finish_load(page, result)
    }
}

impl Screen for HomeScreen {
    fn title(&self) -> Option<String> {
        Some(HOME_TITLE.to_string())
    }

    fn hides_navigation_bar(&self) -> Option<bool> {
        Some(false)
    }
}

// =============================================================================
// Details
// =============================================================================

/// Details of one movie
#[derive(Debug)]
pub struct DetailsScreen {
    ctx: ScreenContext,
    movie: Movie,
    details: RefCell<Option<MovieDetails>>,
}

impl DetailsScreen {
    /// Create the screen for `movie`
    pub fn new(ctx: &ScreenContext, movie: Movie) -> Self {
        Self {
            ctx: ctx.clone(),
            movie,
            details: RefCell::new(None),
        }
    }

    /// The listed movie
    pub fn movie(&self) -> &Movie {
        &self.movie
    }

    /// Poster URL
    pub fn poster_url(&self) -> Option<String> {
        self.movie.poster_url(&self.ctx.image_base_url)
    }

    /// Loaded details
    pub fn details(&self) -> Option<MovieDetails> {
        self.details.borrow().clone()
    }

    /// Rating line, `0.0/10` until details load
    pub fn rating_label(&self) -> String {
        self.details
            .borrow()
            .as_ref()
            .map(MovieDetails::rating_label)
            .unwrap_or_else(|| "0.0/10".to_string())
    }

    /// Fetch details with credits
    pub async fn appear(&self) -> Result<(), CatalogError> {
        match self.ctx.catalog.fetch_movie_details(self.movie.id).await {
            Ok(details) => {
                self.details.replace(Some(details));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to fetch details of movie {}: {}", self.movie.id, e);
                Err(e)
            }
        }
    }
}

impl Screen for DetailsScreen {
    fn title(&self) -> Option<String> {
        Some(self.movie.title.clone())
    }
}
