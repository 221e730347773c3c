//! User interface layer for Cinema DB
//!
//! This crate bridges screen models onto an imperative navigation host.
//!
//! # Modules
//!
//! - [`host`] - Navigation host trait, hosted screens, in-memory host
//! - [`navigation`] - Stack router, destination registry, navigation links
//! - [`forms`] - Login and registration form models
//! - [`screens`] - Application screens
//!
//! # Example
//!
//! ```rust
//! use app_ui::host::{HostedScreen, InMemoryHost, NavigationHost, Screen};
//! use app_ui::navigation::Router;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Splash;
//! impl Screen for Splash {}
//!
//! struct Welcome;
//! impl Screen for Welcome {
//!     fn hides_navigation_bar(&self) -> Option<bool> {
//!         Some(true)
//!     }
//! }
//!
//! let host = Rc::new(RefCell::new(InMemoryHost::new(HostedScreen::new(Splash))));
//! let router = Router::new();
//! router.attach(&host);
//!
//! router.push(Welcome, true);
//! assert_eq!(host.borrow().stack().len(), 1);
//! assert!(host.borrow().is_navigation_bar_hidden());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod forms;
pub mod host;
pub mod navigation;
pub mod screens;

// Re-export commonly used types
pub use forms::{Credentials, LoginField, LoginForm, RegistrationField, RegistrationForm};

pub use host::{
    DismissCompletion, HostEvent, HostedScreen, InMemoryHost, NavigationHost, Screen, ScreenId,
    ScreenKind,
};

pub use navigation::{
    DestinationKey, DestinationRegistry, NavigationError, NavigationLink, Router, RouterConfig,
    UnresolvedPolicy,
};

pub use screens::{
    register_root_destinations, DetailsScreen, HomeScreen, LoginScreen, RegistrationScreen,
    RootDestination, ScreenContext, SplashScreen, WelcomeScreen,
};
