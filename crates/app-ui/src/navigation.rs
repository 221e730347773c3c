//! Navigation system for Cinema DB
//!
//! This module provides the stack router that screens use to navigate:
//! - Push, replace-stack, pop and pop-to-root over a [`NavigationHost`]
//! - Destinations registered by value type and resolved on demand
//! - Pop-to-destination that reuses a screen already on the stack
//! - Per-screen navigation bar visibility, synced on edge changes
//!
//! The router is single-threaded. It holds a weak reference to the host and
//! owns the destination registry. Screens reach the router through a
//! `Weak<Router>` so resolvers that capture them do not keep it alive.

use crate::host::{HostedScreen, NavigationHost, Screen, ScreenKind};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use thiserror::Error;
use tracing::Span;

// =============================================================================
// Errors
// =============================================================================

/// Navigation error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// No resolver registered for the destination value type
    #[error("Navigation destination {0} is not registered")]
    UnregisteredDestination(&'static str),

    /// The router is not attached to a live host
    #[error("Router is not attached to a navigation host")]
    NoHost,
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;

// =============================================================================
// Configuration
// =============================================================================

/// What to do when a destination value has no registered resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    /// Panic with the missing type name
    Fatal,
    /// Log the failure and leave the stack as it is
    Ignore,
}

impl Default for UnresolvedPolicy {
    /// `Fatal` in debug builds, `Ignore` in release builds
    fn default() -> Self {
        if cfg!(debug_assertions) {
            UnresolvedPolicy::Fatal
        } else {
            UnresolvedPolicy::Ignore
        }
    }
}

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Unresolved destination handling
    pub unresolved: UnresolvedPolicy,
    /// Animate stack transitions
    pub animated: bool,
    /// Span every navigation log line is emitted under
    pub span: Span,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedPolicy::default(),
            animated: true,
            span: tracing::debug_span!("navigation"),
        }
    }
}

impl RouterConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unresolved destination policy
    pub fn with_unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved = policy;
        self
    }

    /// Enable or disable transition animations
    pub fn with_animations(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    /// Set the logging span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

// =============================================================================
// Destination Registry
// =============================================================================

/// Identity of a destination value type
#[derive(Clone, Copy)]
pub struct DestinationKey {
    id: TypeId,
    name: &'static str,
}

impl DestinationKey {
    /// Key of value type `D`
    pub fn of<D: 'static>() -> Self {
        Self {
            id: TypeId::of::<D>(),
            name: std::any::type_name::<D>(),
        }
    }

    /// Full type name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for DestinationKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DestinationKey {}

impl std::hash::Hash for DestinationKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DestinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type Resolver = Rc<dyn Fn(&dyn Any) -> Option<HostedScreen>>;

/// Resolvers keyed by destination value type
///
/// One resolver per type; registering again replaces the previous one.
/// Entries are never removed.
#[derive(Default)]
pub struct DestinationRegistry {
    resolvers: HashMap<DestinationKey, Resolver>,
}

impl DestinationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the resolver for values of type `D`
    pub fn register<D, F>(&mut self, resolver: F)
    where
        D: 'static,
        F: Fn(&D) -> HostedScreen + 'static,
    {
        let erased: Resolver =
            Rc::new(move |value: &dyn Any| value.downcast_ref::<D>().map(&resolver));
        self.resolvers.insert(DestinationKey::of::<D>(), erased);
    }

    /// Whether a resolver exists for `D`
    pub fn contains<D: 'static>(&self) -> bool {
        self.resolvers.contains_key(&DestinationKey::of::<D>())
    }

    /// Number of registered value types
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    fn resolver(&self, key: &DestinationKey) -> Option<Resolver> {
        self.resolvers.get(key).cloned()
    }
}

impl fmt::Debug for DestinationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.resolvers.keys()).finish()
    }
}

// =============================================================================
// Router
// =============================================================================

/// Stack router bridging screens onto a navigation host
///
/// # Example
///
/// ```rust
/// use app_ui::host::{HostedScreen, InMemoryHost, NavigationHost, Screen};
/// use app_ui::navigation::Router;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// struct Root;
/// impl Screen for Root {}
///
/// struct Profile(u64);
/// impl Screen for Profile {}
///
/// #[derive(Clone)]
/// struct ProfileRef(u64);
///
/// let host = Rc::new(RefCell::new(InMemoryHost::new(HostedScreen::new(Root))));
/// let router = Router::new();
/// router.attach(&host);
/// router.navigation_destination(|value: &ProfileRef| HostedScreen::new(Profile(value.0)));
///
/// router.push_value(ProfileRef(7), false);
/// assert_eq!(host.borrow().stack().len(), 2);
///
/// // Already on top: ignored
/// router.push_value(ProfileRef(8), false);
/// assert_eq!(host.borrow().stack().len(), 2);
/// ```
pub struct Router {
    host: RefCell<Option<Weak<RefCell<dyn NavigationHost>>>>,
    destinations: RefCell<DestinationRegistry>,
    config: RouterConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router with the default configuration
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with a custom configuration
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            host: RefCell::new(None),
            destinations: RefCell::new(DestinationRegistry::new()),
            config,
        }
    }

    /// Router configuration
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Drive `host` from now on
    ///
    /// Only a weak reference is kept; the caller owns the host.
    pub fn attach<H: NavigationHost + 'static>(&self, host: &Rc<RefCell<H>>) {
        let host: Rc<RefCell<dyn NavigationHost>> = host.clone();
        *self.host.borrow_mut() = Some(Rc::downgrade(&host));
    }

    /// Whether a live host is attached
    pub fn is_attached(&self) -> bool {
        self.upgrade_host().is_some()
    }

    /// Visible screen
    pub fn top(&self) -> Option<HostedScreen> {
        self.with_host(|host| host.top()).flatten()
    }

    /// Number of screens on the stack
    pub fn depth(&self) -> usize {
        self.with_host(|host| host.stack().len()).unwrap_or(0)
    }

    // -------------------------------------------------------------------------
    // Push
    // -------------------------------------------------------------------------

    /// Push a screen
    ///
    /// See [`Router::push_hosted`].
    pub fn push<S: Screen>(&self, screen: S, replace_stack: bool) -> bool {
        self.push_hosted(HostedScreen::new(screen), replace_stack)
    }

    /// Push a hosted screen, or make it the whole stack
    ///
    /// Ignored when the top screen is already of the same kind, so rapid
    /// repeated taps push once. Returns whether the stack changed.
    pub fn push_hosted(&self, screen: HostedScreen, replace_stack: bool) -> bool {
        let _entered = self.config.span.enter();
        let animated = self.config.animated;

        self.with_host(|host| {
            if let Some(top) = host.top() {
                tracing::debug!("Push from {}", top.kind());
                if top.kind() == screen.kind() {
                    tracing::debug!("Push ignored, {} is already on top", screen.kind());
                    return false;
                }
            }

            tracing::debug!("Push to {} (replace stack: {})", screen.kind(), replace_stack);
            if replace_stack {
                host.set_stack(vec![screen], animated);
            } else {
                host.push(screen, animated);
            }
            true
        })
        .unwrap_or(false)
    }

    /// Push the screen registered for `value`'s type
    ///
    /// An unregistered type is handled per [`UnresolvedPolicy`].
    pub fn push_value<D: 'static>(&self, value: D, replace_stack: bool) -> bool {
        match self.resolve(&value) {
            Ok(screen) => self.push_hosted(screen, replace_stack),
            Err(e) => self.unresolved(e),
        }
    }

    // -------------------------------------------------------------------------
    // Pop
    // -------------------------------------------------------------------------

    /// Pop the top screen; does nothing on the root
    pub fn pop(&self) {
        let _entered = self.config.span.enter();
        let animated = self.config.animated;
        self.with_host(|host| {
            if let Some(popped) = host.pop(animated) {
                tracing::debug!("Pop from {}", popped.kind());
            }
        });
    }

    /// Pop down to the first screen
    pub fn pop_to_root(&self) {
        let _entered = self.config.span.enter();
        let animated = self.config.animated;
        self.with_host(|host| {
            tracing::debug!("Pop to root");
            host.pop_to_root(animated);
        });
    }

    /// Pop to root when `action` returns true
    pub fn on_pop_to_root(&self, action: impl FnOnce() -> bool) {
        if action() {
            self.pop_to_root();
        }
    }

    /// Pop to a screen of the same kind as `destination`
    ///
    /// See [`Router::pop_to_hosted`].
    pub fn pop_to<S: Screen>(&self, destination: S) {
        self.pop_to_hosted(HostedScreen::new(destination));
    }

    /// Pop to the screen registered for `value`'s type
    ///
    /// An unregistered type is handled per [`UnresolvedPolicy`].
    pub fn pop_to_value<D: 'static>(&self, value: D) {
        match self.resolve(&value) {
            Ok(screen) => self.pop_to_hosted(screen),
            Err(e) => {
                self.unresolved(e);
            }
        }
    }

    /// Pop to a screen of `destination`'s kind
    ///
    /// Nothing happens when the top screen is already of that kind. If a
    /// screen of that kind is on the stack, everything above it is dropped;
    /// otherwise `destination` is inserted below the top screen. Either way
    /// the stack is first replaced without animation so that the current
    /// top sits directly above the destination, then an animated pop lands
    /// on the destination. A presented modal is dismissed first and the
    /// stack change runs once the dismissal completes.
    pub fn pop_to_hosted(&self, destination: HostedScreen) {
        let _entered = self.config.span.enter();
        let animated = self.config.animated;
        let span = self.config.span.clone();

        self.with_host(move |host| {
            let Some(top) = host.top() else {
                return;
            };
            if top.kind() == destination.kind() {
                tracing::debug!("Pop ignored, {} is already on top", destination.kind());
                return;
            }

            let mutation = move |host: &mut dyn NavigationHost| {
                let _entered = span.enter();
                pop_onto(host, destination, top, animated);
            };

            if host.has_presented_modal() {
                tracing::debug!("Dismissing presented modal before pop");
                host.dismiss_presented(Box::new(mutation));
            } else {
                mutation(host);
            }
        });
    }

    // -------------------------------------------------------------------------
    // Destinations
    // -------------------------------------------------------------------------

    /// Register how values of type `D` become screens
    ///
    /// Registering the same type again replaces the resolver.
    pub fn navigation_destination<D, F>(&self, resolver: F)
    where
        D: 'static,
        F: Fn(&D) -> HostedScreen + 'static,
    {
        tracing::debug!(parent: &self.config.span, "Register destination {}", std::any::type_name::<D>());
        self.destinations.borrow_mut().register(resolver);
    }

    /// Whether values of type `D` can be resolved
    pub fn has_destination<D: 'static>(&self) -> bool {
        self.destinations.borrow().contains::<D>()
    }

    /// Resolve `value` to a new screen instance
    ///
    /// # Errors
    ///
    /// - `NavigationError::UnregisteredDestination` - No resolver for `D`
    pub fn resolve<D: 'static>(&self, value: &D) -> Result<HostedScreen> {
        let key = DestinationKey::of::<D>();
        // Resolvers may register further destinations, so the registry is
        // not borrowed while one runs
        let resolver = self.destinations.borrow().resolver(&key);
        resolver
            .and_then(|resolver| resolver(value))
            .ok_or(NavigationError::UnregisteredDestination(key.name()))
    }

    // -------------------------------------------------------------------------
    // Navigation bar
    // -------------------------------------------------------------------------

    /// Record that `screen` wants the navigation bar hidden or shown
    ///
    /// The preference is stored on the screen and re-applied whenever it
    /// becomes top. The bar itself only changes when `screen` is visible
    /// and its state differs.
    pub fn publish_bar_preference(&self, screen: &HostedScreen, hidden: bool) {
        screen.set_bar_preference(hidden);
        let animated = self.config.animated;
        self.with_host(|host| {
            let visible = host.top().is_some_and(|top| top.id() == screen.id());
            if visible && host.is_navigation_bar_hidden() != hidden {
                tracing::debug!(parent: &self.config.span, "Navigation bar hidden: {}", hidden);
                host.set_navigation_bar_hidden(hidden, animated);
            }
        });
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn upgrade_host(&self) -> Option<Rc<RefCell<dyn NavigationHost>>> {
        self.host.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn with_host<R>(&self, f: impl FnOnce(&mut dyn NavigationHost) -> R) -> Option<R> {
        let Some(host) = self.upgrade_host() else {
            tracing::warn!(parent: &self.config.span, "{}", NavigationError::NoHost);
            return None;
        };
        let mut host = host.borrow_mut();
        Some(f(&mut *host))
    }

    fn unresolved(&self, error: NavigationError) -> bool {
        tracing::error!(parent: &self.config.span, "Failed to get destination: {}", error);
        match self.config.unresolved {
            UnresolvedPolicy::Fatal => panic!("{}", error),
            UnresolvedPolicy::Ignore => false,
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("attached", &self.is_attached())
            .field("destinations", &self.destinations.borrow())
            .field("config", &self.config)
            .finish()
    }
}

/// Land on `destination` with `last` popping away above it
fn pop_onto(
    host: &mut dyn NavigationHost,
    destination: HostedScreen,
    last: HostedScreen,
    animated: bool,
) {
    let stack = host.stack();
    let kind: ScreenKind = destination.kind();

    let mut next: Vec<HostedScreen> = match stack.iter().position(|screen| screen.kind() == kind) {
        Some(index) => stack[..=index].to_vec(),
        None => {
            let below = stack.len().saturating_sub(1);
            let mut next = stack[..below].to_vec();
            next.push(destination);
            next
        }
    };
    let Some(target) = next.last().map(HostedScreen::id) else {
        return;
    };

    tracing::debug!("Pop from {} to {}", last.kind(), kind);
    next.push(last);
    host.set_stack(next, false);
    host.pop_to(target, animated);
}

// =============================================================================
// Navigation Link
// =============================================================================

/// A labelled, tappable navigation trigger
#[derive(Clone)]
pub struct NavigationLink {
    label: String,
    replace_stack: bool,
    action: Rc<dyn Fn(&Router, bool) -> bool>,
}

impl NavigationLink {
    /// Link pushing a screen built on tap
    pub fn to_screen<S, F>(label: impl Into<String>, destination: F) -> Self
    where
        S: Screen,
        F: Fn() -> S + 'static,
    {
        Self {
            label: label.into(),
            replace_stack: false,
            action: Rc::new(move |router, replace| router.push(destination(), replace)),
        }
    }

    /// Link pushing the screen registered for `value`'s type
    pub fn to_value<D: Clone + 'static>(label: impl Into<String>, value: D) -> Self {
        Self {
            label: label.into(),
            replace_stack: false,
            action: Rc::new(move |router, replace| router.push_value(value.clone(), replace)),
        }
    }

    /// Make the destination replace the whole stack
    pub fn replacing_stack(mut self) -> Self {
        self.replace_stack = true;
        self
    }

    /// Link label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether tapping replaces the stack
    pub fn replaces_stack(&self) -> bool {
        self.replace_stack
    }

    /// Navigate; returns whether the stack changed
    pub fn tap(&self, router: &Router) -> bool {
        (self.action)(router, self.replace_stack)
    }
}

impl fmt::Debug for NavigationLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationLink")
            .field("label", &self.label)
            .field("replace_stack", &self.replace_stack)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
