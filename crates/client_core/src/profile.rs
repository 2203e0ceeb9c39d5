use std::sync::Arc;

use shared::domain::{Gender, PhotoSelection, ProfileField, UserProfile};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::GatewayError, gateway::RequestGateway, session::SessionContext, ImagePicker, Navigator,
    Notifier, Prompter, SessionCache,
};

/// Profile screen state. `saved` is the last-persisted snapshot the dirty
/// check compares against; `profile` is the live edit buffer. The two
/// diverge only through explicit field edits or a gender selection.
#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    pub profile: Option<UserProfile>,
    pub saved: Option<UserProfile>,
    pub photo: Option<PhotoSelection>,
    pub loading: bool,
    pub saving_modal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileEvent {
    ProfileLoaded,
    SessionExpired,
    Edited,
    Saved,
    SaveFailed,
    AvatarUploaded,
    AvatarUploadFailed,
}

pub struct ProfileScreen {
    gateway: Arc<dyn RequestGateway>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    image_picker: Arc<dyn ImagePicker>,
    prompter: Arc<dyn Prompter>,
    cache: Arc<dyn SessionCache>,
    session: SessionContext,
    inner: Mutex<ProfileState>,
    events: broadcast::Sender<ProfileEvent>,
}

impl ProfileScreen {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gateway: Arc<dyn RequestGateway>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        image_picker: Arc<dyn ImagePicker>,
        prompter: Arc<dyn Prompter>,
        cache: Arc<dyn SessionCache>,
        session: SessionContext,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            gateway,
            navigator,
            notifier,
            image_picker,
            prompter,
            cache,
            session,
            inner: Mutex::new(ProfileState {
                loading: true,
                ..ProfileState::default()
            }),
            events,
        })
    }

    pub async fn snapshot(&self) -> ProfileState {
        self.inner.lock().await.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ProfileEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ProfileEvent) {
        let _ = self.events.send(event);
    }

    /// Fetches the profile and records the saved snapshot. A distinguished
    /// session-expired code forces a logout; any other failure leaves the
    /// screen loading (re-entering the screen is the recovery path).
    pub async fn initialize(&self) {
        match self.gateway.fetch_profile().await {
            Ok(profile) => {
                let mut state = self.inner.lock().await;
                state.saved = Some(profile.clone());
                state.profile = Some(profile);
                state.loading = false;
                state.saving_modal = false;
                drop(state);
                self.emit(ProfileEvent::ProfileLoaded);
            }
            Err(err) if err.is_session_expired() => {
                self.notifier
                    .show(err.server_message().unwrap_or("session expired"));
                self.force_logout().await;
            }
            Err(GatewayError::Business(rejection)) => {
                warn!(error = %rejection, "profile: fetch rejected by backend");
                self.notifier.show(rejection.message());
            }
            Err(err) => {
                warn!(error = %err, "profile: fetch failed; screen left loading");
            }
        }
    }

    async fn force_logout(&self) {
        if let Err(err) = self.cache.clear().await {
            warn!(error = %err, "profile: failed to clear cached session");
        }
        self.session.clear();
        self.navigator.go_back();
        self.emit(ProfileEvent::SessionExpired);
    }

    /// Functional update of one editable field; the previous record stays
    /// untouched so the saved snapshot remains a valid comparison base.
    pub async fn edit_field(&self, field: ProfileField, value: impl Into<String>) {
        let mut state = self.inner.lock().await;
        let Some(profile) = &state.profile else {
            return;
        };
        state.profile = Some(profile.with_field(field, value));
        drop(state);
        self.emit(ProfileEvent::Edited);
    }

    pub async fn select_gender(&self, gender: Gender) {
        let mut state = self.inner.lock().await;
        let Some(profile) = &state.profile else {
            return;
        };
        state.profile = Some(profile.with_gender(gender));
        drop(state);
        self.emit(ProfileEvent::Edited);
    }

    pub async fn has_unsaved_changes(&self) -> bool {
        let state = self.inner.lock().await;
        state.profile != state.saved
    }

    /// Leaves the screen immediately when the edit buffer matches the
    /// saved snapshot; otherwise the user must confirm discarding. Returns
    /// whether navigation happened.
    pub async fn request_exit(&self) -> bool {
        if !self.has_unsaved_changes().await {
            self.navigator.go_back();
            return true;
        }

        if self
            .prompter
            .confirm_discard("discard unsaved changes?")
            .await
        {
            self.navigator.go_back();
            true
        } else {
            false
        }
    }

    /// Persists the edit buffer. On failure the buffer is left intact so
    /// the user can retry without re-entering anything.
    pub async fn save(&self) {
        let profile = {
            let mut state = self.inner.lock().await;
            let Some(profile) = state.profile.clone() else {
                return;
            };
            state.saving_modal = true;
            profile
        };

        match self.gateway.update_profile(&profile).await {
            Ok(()) => {
                info!("profile: update accepted");
                {
                    let mut state = self.inner.lock().await;
                    state.saving_modal = false;
                    state.saved = Some(profile.clone());
                }
                if let Some(next) = self
                    .session
                    .update(|session| session.nickname = profile.nickname.clone())
                {
                    if let Err(err) = self.cache.save(&next).await {
                        warn!(error = %err, "profile: failed to persist cached session");
                    }
                }
                self.notifier.show("profile updated");
                self.emit(ProfileEvent::Saved);
                self.navigator.go_back();
            }
            Err(err) if err.is_session_expired() => {
                self.inner.lock().await.saving_modal = false;
                self.notifier
                    .show(err.server_message().unwrap_or("session expired"));
                self.force_logout().await;
            }
            Err(err) => {
                warn!(error = %err, "profile: update failed");
                self.inner.lock().await.saving_modal = false;
                self.notifier
                    .show(err.server_message().unwrap_or("update failed"));
                self.emit(ProfileEvent::SaveFailed);
            }
        }
    }

    /// Runs the device image picker; cancellation and picker errors change
    /// nothing.
    pub async fn pick_avatar(&self) {
        match self.image_picker.pick().await {
            Ok(Some(photo)) => self.upload_avatar(Some(photo)).await,
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "profile: image picker failed");
            }
        }
    }

    /// Uploads the selected photo. The local display is updated only after
    /// the backend confirms; the session cache picks up the new avatar URI.
    pub async fn upload_avatar(&self, photo: Option<PhotoSelection>) {
        let Some(photo) = photo else {
            self.notifier.show("no image selected");
            return;
        };

        {
            self.inner.lock().await.saving_modal = true;
        }

        match self.gateway.upload_avatar(&photo).await {
            Ok(avatar_uri) => {
                info!(uri = %avatar_uri, "profile: avatar stored");
                {
                    let mut state = self.inner.lock().await;
                    state.saving_modal = false;
                    state.photo = Some(photo);
                }
                if let Some(next) = self
                    .session
                    .update(|session| session.avatar = avatar_uri.clone())
                {
                    if let Err(err) = self.cache.save(&next).await {
                        warn!(error = %err, "profile: failed to persist cached session");
                    }
                }
                self.notifier.show("avatar updated");
                self.emit(ProfileEvent::AvatarUploaded);
            }
            Err(err) if err.is_session_expired() => {
                self.inner.lock().await.saving_modal = false;
                self.notifier
                    .show(err.server_message().unwrap_or("session expired"));
                self.force_logout().await;
            }
            Err(err) => {
                warn!(error = %err, "profile: avatar upload failed");
                self.inner.lock().await.saving_modal = false;
                self.notifier
                    .show(err.server_message().unwrap_or("avatar upload failed"));
                self.emit(ProfileEvent::AvatarUploadFailed);
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/profile_tests.rs"]
mod tests;
