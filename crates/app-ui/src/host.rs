//! Navigation host abstraction
//!
//! The host is the platform navigation controller: it owns the live
//! back-stack of [`HostedScreen`]s, the navigation bar, and any modal
//! presented above the stack. The [`Router`](crate::navigation::Router)
//! drives it through the [`NavigationHost`] trait and never owns it.
//!
//! [`InMemoryHost`] is a complete host kept in memory. It records every
//! operation as a [`HostEvent`], which makes it the host used by the
//! application shell in headless runs and by tests.

use std::any::{Any, TypeId};
use std::cell::Cell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use uuid::Uuid;

// =============================================================================
// Screens
// =============================================================================

/// A screen that can be placed on the navigation stack
pub trait Screen: Any {
    /// Title shown in the navigation bar
    fn title(&self) -> Option<String> {
        None
    }

    /// Initial navigation bar preference
    ///
    /// `None` leaves the bar as the previous screen left it.
    fn hides_navigation_bar(&self) -> Option<bool> {
        None
    }
}

/// Identity of a screen type
///
/// Two screens have the same kind when they are values of the same Rust
/// type. The router uses it to detect duplicate pushes and to find
/// destinations already on the stack.
#[derive(Clone, Copy)]
pub struct ScreenKind {
    id: TypeId,
    name: &'static str,
}

impl ScreenKind {
    /// Kind of screen type `S`
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    /// Short type name, without the module path
    pub fn name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for ScreenKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScreenKind {}

impl Hash for ScreenKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unique id of one hosted screen instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(Uuid);

impl ScreenId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct Hosted {
    id: ScreenId,
    kind: ScreenKind,
    title: Option<String>,
    hide_bar: Cell<Option<bool>>,
    screen: Rc<dyn Any>,
}

/// A screen instance placed on a navigation stack
///
/// Cloning is cheap and yields a handle to the same instance.
#[derive(Clone)]
pub struct HostedScreen(Rc<Hosted>);

impl HostedScreen {
    /// Wrap a screen for hosting
    pub fn new<S: Screen>(screen: S) -> Self {
        let title = screen.title();
        let hide_bar = screen.hides_navigation_bar();
        Self(Rc::new(Hosted {
            id: ScreenId::new(),
            kind: ScreenKind::of::<S>(),
            title,
            hide_bar: Cell::new(hide_bar),
            screen: Rc::new(screen),
        }))
    }

    /// Instance id
    pub fn id(&self) -> ScreenId {
        self.0.id
    }

    /// Screen type identity
    pub fn kind(&self) -> ScreenKind {
        self.0.kind
    }

    /// Navigation bar title
    pub fn title(&self) -> Option<&str> {
        self.0.title.as_deref()
    }

    /// Whether this hosts a screen of type `S`
    pub fn is<S: Screen>(&self) -> bool {
        self.0.kind == ScreenKind::of::<S>()
    }

    /// Borrow the hosted screen as `S`
    pub fn screen<S: Screen>(&self) -> Option<&S> {
        self.0.screen.downcast_ref::<S>()
    }

    /// Current navigation bar preference
    pub fn bar_preference(&self) -> Option<bool> {
        self.0.hide_bar.get()
    }

    pub(crate) fn set_bar_preference(&self, hidden: bool) {
        self.0.hide_bar.set(Some(hidden));
    }
}

impl PartialEq for HostedScreen {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for HostedScreen {}

impl fmt::Debug for HostedScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedScreen")
            .field("kind", &self.0.kind)
            .field("id", &self.0.id)
            .field("title", &self.0.title)
            .finish()
    }
}

// =============================================================================
// Host Trait
// =============================================================================

/// Continuation run by the host once a modal dismissal completes
pub type DismissCompletion = Box<dyn FnOnce(&mut dyn NavigationHost)>;

/// Imperative navigation controller driven by the router
///
/// When a screen becomes top through any of these operations, the host
/// applies that screen's bar preference, if it has one.
pub trait NavigationHost {
    /// Live stack, bottom to top
    fn stack(&self) -> &[HostedScreen];

    /// Visible screen
    fn top(&self) -> Option<HostedScreen> {
        self.stack().last().cloned()
    }

    /// Push a screen
    fn push(&mut self, screen: HostedScreen, animated: bool);

    /// Replace the whole stack
    fn set_stack(&mut self, screens: Vec<HostedScreen>, animated: bool);

    /// Pop the top screen, keeping at least one
    fn pop(&mut self, animated: bool) -> Option<HostedScreen>;

    /// Pop down to the first screen
    fn pop_to_root(&mut self, animated: bool);

    /// Pop down to the screen with `id`; false when it is not on the stack
    fn pop_to(&mut self, id: ScreenId, animated: bool) -> bool;

    /// Whether the navigation bar is hidden
    fn is_navigation_bar_hidden(&self) -> bool;

    /// Show or hide the navigation bar
    fn set_navigation_bar_hidden(&mut self, hidden: bool, animated: bool);

    /// Whether a modal is presented above the stack
    fn has_presented_modal(&self) -> bool;

    /// Dismiss the presented modal and run `completion` once it is gone
    fn dismiss_presented(&mut self, completion: DismissCompletion);
}

// =============================================================================
// In-memory Host
// =============================================================================

/// Operation recorded by [`InMemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Screen pushed
    Push(ScreenKind),
    /// Stack replaced
    SetStack(Vec<ScreenKind>),
    /// Top screen popped
    Pop(ScreenKind),
    /// Popped to root
    PopToRoot,
    /// Popped to a screen
    PopTo(ScreenKind),
    /// Navigation bar visibility changed
    BarHidden(bool),
    /// Modal presented
    ModalPresented(ScreenKind),
    /// Modal dismissed
    ModalDismissed(ScreenKind),
}

/// Navigation host kept in memory
///
/// Modal dismissals are asynchronous: [`dismiss_presented`] only records
/// the request, and the continuation runs when [`complete_dismissal`] is
/// called, the way a platform runs it after the dismiss animation.
///
/// [`dismiss_presented`]: NavigationHost::dismiss_presented
/// [`complete_dismissal`]: InMemoryHost::complete_dismissal
pub struct InMemoryHost {
    stack: Vec<HostedScreen>,
    bar_hidden: bool,
    modal: Option<HostedScreen>,
    pending_dismissals: Vec<DismissCompletion>,
    events: Vec<HostEvent>,
}

impl InMemoryHost {
    /// Create a host showing `root`
    pub fn new(root: HostedScreen) -> Self {
        let mut host = Self {
            stack: vec![root],
            bar_hidden: false,
            modal: None,
            pending_dismissals: Vec::new(),
            events: Vec::new(),
        };
        host.apply_top_bar_preference(false);
        host
    }

    /// Recorded operations, oldest first
    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    /// Forget recorded operations
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Kinds on the stack, bottom to top
    pub fn kinds(&self) -> Vec<ScreenKind> {
        self.stack.iter().map(HostedScreen::kind).collect()
    }

    /// Present a modal above the stack
    pub fn present(&mut self, screen: HostedScreen) {
        self.events.push(HostEvent::ModalPresented(screen.kind()));
        self.modal = Some(screen);
    }

    /// Presented modal
    pub fn presented(&self) -> Option<&HostedScreen> {
        self.modal.as_ref()
    }

    /// Whether a dismissal is waiting to complete
    pub fn has_pending_dismissal(&self) -> bool {
        !self.pending_dismissals.is_empty()
    }

    /// Finish the oldest pending dismissal and run its continuation
    ///
    /// Returns false when nothing was pending.
    pub fn complete_dismissal(&mut self) -> bool {
        if self.pending_dismissals.is_empty() {
            return false;
        }
        let completion = self.pending_dismissals.remove(0);
        if let Some(modal) = self.modal.take() {
            self.events.push(HostEvent::ModalDismissed(modal.kind()));
        }
        completion(self);
        true
    }

    /// User-driven back navigation (back button or swipe)
    pub fn interactive_pop(&mut self) -> Option<HostedScreen> {
        self.pop(true)
    }

    fn apply_top_bar_preference(&mut self, animated: bool) {
        let preference = self.stack.last().and_then(HostedScreen::bar_preference);
        if let Some(hidden) = preference {
            if hidden != self.bar_hidden {
                self.set_navigation_bar_hidden(hidden, animated);
            }
        }
    }
}

impl NavigationHost for InMemoryHost {
    fn stack(&self) -> &[HostedScreen] {
        &self.stack
    }

    fn push(&mut self, screen: HostedScreen, animated: bool) {
        self.events.push(HostEvent::Push(screen.kind()));
        self.stack.push(screen);
        self.apply_top_bar_preference(animated);
    }

    fn set_stack(&mut self, screens: Vec<HostedScreen>, animated: bool) {
        if screens.is_empty() {
            tracing::warn!("Ignoring empty navigation stack");
            return;
        }
        self.events.push(HostEvent::SetStack(
            screens.iter().map(HostedScreen::kind).collect(),
        ));
        self.stack = screens;
        self.apply_top_bar_preference(animated);
    }

    fn pop(&mut self, animated: bool) -> Option<HostedScreen> {
        if self.stack.len() <= 1 {
            return None;
        }
        let popped = self.stack.pop()?;
        self.events.push(HostEvent::Pop(popped.kind()));
        self.apply_top_bar_preference(animated);
        Some(popped)
    }

    fn pop_to_root(&mut self, animated: bool) {
        if self.stack.len() <= 1 {
            return;
        }
        self.stack.truncate(1);
        self.events.push(HostEvent::PopToRoot);
        self.apply_top_bar_preference(animated);
    }

    fn pop_to(&mut self, id: ScreenId, animated: bool) -> bool {
        let Some(index) = self.stack.iter().position(|screen| screen.id() == id) else {
            return false;
        };
        self.stack.truncate(index + 1);
        self.events.push(HostEvent::PopTo(self.stack[index].kind()));
        self.apply_top_bar_preference(animated);
        true
    }

    fn is_navigation_bar_hidden(&self) -> bool {
        self.bar_hidden
    }

    fn set_navigation_bar_hidden(&mut self, hidden: bool, _animated: bool) {
        self.bar_hidden = hidden;
        self.events.push(HostEvent::BarHidden(hidden));
    }

    fn has_presented_modal(&self) -> bool {
        self.modal.is_some()
    }

    fn dismiss_presented(&mut self, completion: DismissCompletion) {
        if self.modal.is_none() {
            completion(self);
            return;
        }
        self.pending_dismissals.push(completion);
    }
}
