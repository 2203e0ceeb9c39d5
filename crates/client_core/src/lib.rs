//! Screen controllers for the food-ordering client.
//!
//! Each screen is a finite-state view model: it owns the state a renderer
//! draws from, and every external concern (REST gateway, place picker,
//! toasts, navigation, image picker, session cache) is a trait object
//! injected at construction. Controllers never render; a shell subscribes
//! to their event channels and reads snapshots.

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{PhotoSelection, Place, UserSession},
    protocol::OrderPayload,
};

pub mod debounce;
pub mod error;
pub mod gateway;
pub mod menu;
pub mod profile;
pub mod session;
mod session_cache;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{HttpRequestGateway, RequestGateway};
pub use menu::{MenuEvent, MenuScreen, MenuState, OrderDraft};
pub use profile::{ProfileEvent, ProfileScreen, ProfileState};
pub use session::SessionContext;
pub use session_cache::DurableSessionCache;

/// App moved between background and foreground. Publishers send an event
/// only on an actual transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycleEvent {
    Foreground,
    Background,
}

/// Navigation targets the controllers dispatch to the shell.
///
/// `Login` carries the in-progress order so the flow can resume into order
/// creation after sign-in; a shell that cancels the login is expected to
/// call [`MenuScreen::reload`] so the menu reflects current state.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Order(OrderPayload),
    Login { resume: OrderPayload },
}

/// Resolves the pickup place, either automatically (nearest/default) or by
/// the user working through the picker UI. `Ok(None)` means the picker
/// could not produce a place.
#[async_trait]
pub trait PlacePicker: Send + Sync {
    async fn resolve_place(&self) -> Result<Option<Place>>;
}

/// Fire-and-forget user-visible toast.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
    fn go_back(&self);
    /// Shows or hides the floating place-picker affordance in the shell
    /// chrome while an order is being assembled.
    fn set_picker_affordance(&self, visible: bool);
}

/// Device image picker. `Ok(None)` means the user cancelled.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick(&self) -> Result<Option<PhotoSelection>>;
}

/// Modal confirmation dialog, asked as an explicit request/response
/// exchange rather than a callback wired into the dialog.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn confirm_discard(&self, message: &str) -> bool;
}

/// Local persistence for the cached user session.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn load(&self) -> Result<Option<UserSession>>;
    async fn save(&self, session: &UserSession) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}
