//! Authentication session: token, profile and their durable copy

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    api::{self, Gateway},
    error::{AppError, AppResult},
    models::user::{Credentials, EmailRequest, Profile, RegisterRequest},
    services::{
        events::{Event, EventBus, Route},
        storage::Storage,
    },
};

pub const TOKEN_KEY: &str = "token";
pub const PROFILE_KEY: &str = "userInfo";

#[derive(Debug, Default)]
struct SessionState {
    token: String,
    profile: Profile,
    /// Bumped on every login and teardown; a request remembers the epoch it
    /// was sent under so a late 401 cannot end a newer session.
    epoch: u64,
}

/// Cached data that belongs to the logged-in user
#[async_trait]
pub trait UserScoped: Send + Sync {
    async fn clear_user_data(&self);
}

/// The single active session of this client.
///
/// Cloning shares the same state. The durable copy is written on every
/// change and read back once, at construction. Caches bound with
/// [`Session::bind`] are emptied whenever the session ends, be it a logout
/// or an expiry.
#[derive(Clone)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn Storage>,
    events: EventBus,
    bound: Arc<Mutex<Vec<Weak<dyn UserScoped>>>>,
}

impl Session {
    /// Rebuild the session persisted by a previous run, if any
    pub fn restore(storage: Arc<dyn Storage>, events: EventBus) -> Self {
        let token = storage.get(TOKEN_KEY).unwrap_or_default();
        let profile = if token.is_empty() {
            Profile::default()
        } else {
            storage.get_json(PROFILE_KEY).unwrap_or_default()
        };

        if !token.is_empty() {
            tracing::info!(user_id = %profile.user_id, "restored persisted session");
        }

        Self {
            state: Arc::new(RwLock::new(SessionState {
                token,
                profile,
                epoch: 0,
            })),
            storage,
            events,
            bound: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Empty `cache` every time the session ends
    pub fn bind(&self, cache: Weak<dyn UserScoped>) {
        self.bound.lock().unwrap_or_else(PoisonError::into_inner).push(cache);
    }

    /// Always exactly "token is non-empty"
    pub async fn is_authenticated(&self) -> bool {
        !self.state.read().await.token.is_empty()
    }

    pub async fn token(&self) -> Option<String> {
        let state = self.state.read().await;
        (!state.token.is_empty()).then(|| state.token.clone())
    }

    pub async fn profile(&self) -> Profile {
        self.state.read().await.profile.clone()
    }

    pub async fn user_id(&self) -> Option<String> {
        let state = self.state.read().await;
        (!state.token.is_empty() && !state.profile.user_id.is_empty()).then(|| state.profile.user_id.clone())
    }

    /// Token to send and the epoch it belongs to
    pub(crate) async fn credential(&self) -> (Option<String>, u64) {
        let state = self.state.read().await;
        let token = (!state.token.is_empty()).then(|| state.token.clone());
        (token, state.epoch)
    }

    /// Start a session, replacing any previous one
    pub async fn establish(&self, token: String, profile: Profile) -> AppResult<()> {
        {
            let mut state = self.state.write().await;
            self.storage.set(TOKEN_KEY, &token)?;
            self.storage.set_json(PROFILE_KEY, &profile)?;
            state.token = token;
            state.profile = profile;
            state.epoch += 1;
        }
        self.events.emit(Event::UserChanged);
        Ok(())
    }

    /// End the session unconditionally
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            self.reset(&mut state);
        }
        self.clear_bound().await;
        self.events.emit(Event::UserChanged);
    }

    /// End the session only if it is still the one of `epoch`.
    /// Returns whether this call performed the teardown.
    pub async fn expire(&self, epoch: u64) -> bool {
        {
            let mut state = self.state.write().await;
            if state.epoch != epoch || state.token.is_empty() {
                return false;
            }
            self.reset(&mut state);
        }
        self.clear_bound().await;
        self.events.emit(Event::UserChanged);
        true
    }

    /// Shallow-merge server profile data and persist the result
    pub async fn merge_profile(&self, update: &Value) -> AppResult<Profile> {
        let mut state = self.state.write().await;
        let mut profile = state.profile.clone();
        profile.merge(update)?;
        if !state.token.is_empty() {
            self.storage.set_json(PROFILE_KEY, &profile)?;
        }
        state.profile = profile.clone();
        Ok(profile)
    }

    async fn clear_bound(&self) {
        let caches: Vec<Arc<dyn UserScoped>> = {
            let mut bound = self.bound.lock().unwrap_or_else(PoisonError::into_inner);
            bound.retain(|cache| cache.strong_count() > 0);
            bound.iter().filter_map(Weak::upgrade).collect()
        };
        for cache in caches {
            cache.clear_user_data().await;
        }
    }

    fn reset(&self, state: &mut SessionState) {
        state.token.clear();
        state.profile = Profile::default();
        state.epoch += 1;

        for key in [TOKEN_KEY, PROFILE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to remove persisted session value");
            }
        }
    }
}

/// Login/logout lifecycle and account creation
#[derive(Clone)]
pub struct SessionStore {
    gateway: Gateway,
    session: Session,
    events: EventBus,
}

impl SessionStore {
    pub fn new(gateway: Gateway, session: Session, events: EventBus) -> Self {
        Self {
            gateway,
            session,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Authenticate and start a session with the normalized profile
    pub async fn login(&self, credentials: &Credentials) -> AppResult<Profile> {
        credentials.validate()?;

        let response = api::auth::login(&self.gateway, credentials).await?;
        if response.token.is_empty() {
            return Err(AppError::ResponseShape("login response carries an empty token".to_string()));
        }

        tracing::info!(user_id = %response.profile.user_id, role = %response.profile.role, "user logged in");

        let profile = response.profile;
        self.session.establish(response.token, profile.clone()).await?;
        Ok(profile)
    }

    pub async fn logout(&self) {
        let user_id = self.session.profile().await.user_id;
        self.session.clear().await;
        tracing::info!(%user_id, "user logged out");
        self.events.navigate(Route::Login);
    }

    /// Create an account; returns the new user id
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<String> {
        request.validate()?;
        let response = api::auth::register(&self.gateway, request).await?;
        tracing::info!(user_id = %response.user_id, "account registered");
        Ok(response.user_id)
    }

    pub async fn send_verification_code(&self, email: &str) -> AppResult<()> {
        let request = EmailRequest {
            email: email.trim().to_string(),
        };
        request.validate()?;
        api::auth::send_verification_code(&self.gateway, &request).await?;
        Ok(())
    }
}
