//! Login and registration screen

use crate::{
    error::{AppError, AppResult, Notice},
    models::user::{Credentials, Profile, RegisterRequest},
    services::{
        events::{EventBus, Route},
        session::SessionStore,
    },
    views::{
        countdown::{Countdown, CODE_RESEND_SECONDS},
        report_failure,
    },
};

pub struct LoginView {
    session: SessionStore,
    events: EventBus,
    countdown: Countdown,
    pub submitting: bool,
}

impl LoginView {
    pub fn new(session: SessionStore, events: EventBus) -> Self {
        Self {
            session,
            events,
            countdown: Countdown::new(),
            submitting: false,
        }
    }

    /// Seconds before another code may be sent
    pub fn code_cooldown(&self) -> u32 {
        self.countdown.remaining()
    }

    pub async fn login(&mut self, credentials: &Credentials) -> AppResult<Profile> {
        self.submitting = true;
        let result = self.session.login(credentials).await;
        self.submitting = false;

        match &result {
            Ok(_) => {
                self.events.notify(Notice::Success("Logged in".to_string()));
                self.events.navigate(Route::Home);
            }
            // A 401 here is a credential problem, not an expired session
            Err(e) if !matches!(e, AppError::Network(_)) && e.status().map_or(true, |s| s < 500) => {
                self.events.notify(Notice::Error(format!("Login failed: {}", e.user_message())));
            }
            Err(_) => {}
        }
        result
    }

    /// Request a registration code, refused while the previous one cools down
    pub async fn send_code(&mut self, email: &str) -> AppResult<()> {
        if self.countdown.is_running() {
            return Err(AppError::Validation(format!(
                "wait {} seconds before requesting another code",
                self.countdown.remaining()
            )));
        }

        self.session.send_verification_code(email).await?;
        self.countdown.start(CODE_RESEND_SECONDS);
        self.events.notify(Notice::Success("Verification code sent".to_string()));
        Ok(())
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> AppResult<String> {
        self.submitting = true;
        let result = self.session.register(request).await;
        self.submitting = false;

        match &result {
            Ok(_) => {
                self.countdown.stop();
                self.events
                    .notify(Notice::Success("Registration complete, please log in".to_string()));
            }
            Err(e) => report_failure(&self.events, "Registration failed", e),
        }
        result
    }
}
