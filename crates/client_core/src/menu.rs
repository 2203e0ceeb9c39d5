use std::{sync::Arc, time::Duration};

use shared::{
    domain::{DateWindow, MenuItem, Place},
    protocol::OrderPayload,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    debounce::DebounceSlot, gateway::RequestGateway, session::SessionContext, AppLifecycleEvent,
    Navigator, Notifier, PlacePicker, Route,
};

/// Coalesces rapid picker interactions after a place resolves.
const COLD_START_DEBOUNCE: Duration = Duration::from_millis(300);
/// Longer window for pull-to-refresh so the gesture settles first.
const REFRESH_DEBOUNCE: Duration = Duration::from_millis(800);

/// Quantity selection for the order being assembled, plus the visibility
/// of the order-confirmation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderDraft {
    pub count: u32,
    pub bar_visible: bool,
}

impl OrderDraft {
    pub fn is_reset(&self) -> bool {
        self.count == 0 && !self.bar_visible
    }
}

/// Everything the menu screen renders from. `menu` distinguishes "not yet
/// fetched" (`None`) from "fetched and empty" (`Some([])`); the latter is
/// the no-data placeholder branch, not an error.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    pub place: Option<Place>,
    pub menu: Option<Vec<MenuItem>>,
    pub order: OrderDraft,
    pub date_window: DateWindow,
    pub loading: bool,
    pub refreshing: bool,
    pub error: bool,
    pub picker_open: bool,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent {
    PlaceResolved(Place),
    PlaceResolutionFailed,
    MenuLoaded,
    MenuFetchFailed,
    OrderDraftChanged(OrderDraft),
}

pub struct MenuScreen {
    gateway: Arc<dyn RequestGateway>,
    picker: Arc<dyn PlacePicker>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    session: SessionContext,
    inner: Mutex<MenuState>,
    fetch_slot: DebounceSlot,
    lifecycle_task: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<MenuEvent>,
}

impl MenuScreen {
    pub fn new(
        gateway: Arc<dyn RequestGateway>,
        picker: Arc<dyn PlacePicker>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        session: SessionContext,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            gateway,
            picker,
            navigator,
            notifier,
            session,
            inner: Mutex::new(MenuState::default()),
            fetch_slot: DebounceSlot::new(),
            lifecycle_task: Mutex::new(None),
            events,
        })
    }

    pub async fn snapshot(&self) -> MenuState {
        self.inner.lock().await.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<MenuEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: MenuEvent) {
        let _ = self.events.send(event);
    }

    /// First activation: starts listening for foreground transitions. No
    /// network call is issued until a place is resolved.
    pub async fn initialize(self: &Arc<Self>, mut lifecycle: broadcast::Receiver<AppLifecycleEvent>) {
        let screen = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                match lifecycle.recv().await {
                    Ok(AppLifecycleEvent::Foreground) => screen.reload().await,
                    Ok(AppLifecycleEvent::Background) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let mut slot = self.lifecycle_task.lock().await;
        if let Some(prev) = slot.replace(task) {
            prev.abort();
        }
    }

    /// Cancels the pending fetch timer and the lifecycle listener. Results
    /// of an already-dispatched request are dropped by the shell, not here.
    pub async fn teardown(&self) {
        self.fetch_slot.cancel().await;
        if let Some(task) = self.lifecycle_task.lock().await.take() {
            task.abort();
        }
    }

    /// No place yet: ask the picker for one. Otherwise re-fetch the menu
    /// for the current place with refresh semantics.
    pub async fn reload(self: &Arc<Self>) {
        let has_place = { self.inner.lock().await.place.is_some() };
        if has_place {
            self.refresh_menu().await;
        } else {
            self.resolve_place().await;
        }
    }

    async fn resolve_place(self: &Arc<Self>) {
        let resolved = match self.picker.resolve_place().await {
            Ok(place) => place,
            Err(err) => {
                warn!(error = %err, "menu: place resolution failed");
                None
            }
        };
        self.on_place_resolved(resolved).await;
    }

    /// A place resolution arrived. `None` means the app cannot proceed
    /// without a place; the screen shows the full-screen error state.
    pub async fn on_place_resolved(self: &Arc<Self>, place: Option<Place>) {
        let Some(place) = place else {
            let mut state = self.inner.lock().await;
            state.error = true;
            state.loading = false;
            drop(state);
            self.emit(MenuEvent::PlaceResolutionFailed);
            return;
        };

        {
            let mut state = self.inner.lock().await;
            state.place = Some(place.clone());
            state.order = OrderDraft::default();
            state.loading = true;
            self.navigator.set_picker_affordance(true);
        }
        info!(place_id = place.id.0, place = %place.name, "menu: place selected");
        self.emit(MenuEvent::PlaceResolved(place));
        self.schedule_fetch(COLD_START_DEBOUNCE).await;
    }

    /// Pull-to-refresh for the current place.
    pub async fn refresh_menu(self: &Arc<Self>) {
        {
            let mut state = self.inner.lock().await;
            if state.place.is_none() {
                return;
            }
            state.refreshing = true;
        }
        self.schedule_fetch(REFRESH_DEBOUNCE).await;
    }

    async fn schedule_fetch(self: &Arc<Self>, delay: Duration) {
        let screen = Arc::clone(self);
        self.fetch_slot
            .schedule(delay, async move {
                screen.fetch_menu().await;
            })
            .await;
    }

    async fn fetch_menu(&self) {
        let selected = { self.inner.lock().await.place.clone() };
        let Some(place) = selected else {
            return;
        };
        let session_id = self.session.session_id();

        match self
            .gateway
            .fetch_menu(place.id, session_id.as_deref())
            .await
        {
            Ok(payload) => {
                let mut state = self.inner.lock().await;
                info!(
                    place_id = place.id.0,
                    items = payload.food_list.len(),
                    "menu: daily menu replaced"
                );
                state.menu = Some(payload.food_list);
                state.date_window =
                    DateWindow::from_millis(payload.timestamp, payload.end_timestamp);
                state.loading = false;
                state.refreshing = false;
                drop(state);
                self.emit(MenuEvent::MenuLoaded);
            }
            Err(err) => {
                warn!(place_id = place.id.0, error = %err, "menu: fetch failed");
                let mut state = self.inner.lock().await;
                state.error = true;
                state.loading = false;
                state.refreshing = false;
                drop(state);
                self.emit(MenuEvent::MenuFetchFailed);
            }
        }
    }

    /// An error may stem from a stale place, not just a transient network
    /// blip, so recovery re-resolves the place from scratch.
    pub async fn retry(self: &Arc<Self>) {
        {
            let mut state = self.inner.lock().await;
            state.error = false;
            state.loading = true;
        }
        self.resolve_place().await;
    }

    pub async fn open_place_picker(&self) {
        self.inner.lock().await.picker_open = true;
    }

    /// Manual picker interaction finished. Unlike automatic resolution, a
    /// dismissed picker is reported to the user instead of retried.
    pub async fn on_place_picker_closed(self: &Arc<Self>, selection: Option<Place>) {
        {
            self.inner.lock().await.picker_open = false;
        }
        if selection.is_none() {
            self.notifier.show("no place selected");
        }
        self.on_place_resolved(selection).await;
    }

    /// External refresh request (navigation param): honored only while the
    /// order bar is hidden and the token actually changed. The token is
    /// recorded either way.
    pub async fn on_external_refresh(self: &Arc<Self>, token: &str) {
        let should_reload = {
            let mut state = self.inner.lock().await;
            let changed = !token.is_empty()
                && state.refresh_token.as_deref() != Some(token)
                && !state.order.bar_visible;
            state.refresh_token = Some(token.to_string());
            changed
        };
        if should_reload {
            self.reload().await;
        }
    }

    pub async fn increment_quantity(&self) {
        let mut state = self.inner.lock().await;
        let Some(items) = state.menu.as_deref() else {
            return;
        };
        if items.is_empty() {
            return;
        }

        state.order.count += 1;
        state.order.bar_visible = true;
        self.navigator.set_picker_affordance(false);
        let order = state.order;
        drop(state);
        self.emit(MenuEvent::OrderDraftChanged(order));
    }

    pub async fn decrement_quantity(&self) {
        let mut state = self.inner.lock().await;
        if state.order.count == 0 {
            return;
        }
        if state.order.count == 1 {
            state.order.bar_visible = false;
            self.navigator.set_picker_affordance(true);
        }
        state.order.count -= 1;
        let order = state.order;
        drop(state);
        self.emit(MenuEvent::OrderDraftChanged(order));
    }

    pub async fn cancel_order(&self) {
        let mut state = self.inner.lock().await;
        if state.order.is_reset() {
            return;
        }
        state.order = OrderDraft::default();
        self.navigator.set_picker_affordance(true);
        let order = state.order;
        drop(state);
        self.emit(MenuEvent::OrderDraftChanged(order));
    }

    /// Hands the assembled order to the shell: straight to order creation
    /// when signed in, otherwise through the login flow with the payload
    /// attached so the order survives the detour.
    pub async fn confirm_order(&self) {
        let payload = {
            let state = self.inner.lock().await;
            let Some(place) = &state.place else {
                return;
            };
            let Some(featured) = state.menu.as_deref().and_then(|items| items.first()) else {
                return;
            };
            OrderPayload {
                food_id: featured.food_id,
                place_id: place.id,
                quantity: state.order.count,
                total: f64::from(state.order.count) * featured.price,
            }
        };

        if self.session.is_signed_in() {
            self.navigator.navigate(Route::Order(payload));
        } else {
            self.navigator.navigate(Route::Login { resume: payload });
        }
    }
}

#[cfg(test)]
#[path = "tests/menu_tests.rs"]
mod tests;
