//! Four-step password recovery

use validator::Validate;

use crate::{
    api::{self, Gateway},
    error::{AppError, AppResult, Notice},
    models::user::{EmailRequest, PasswordResetRequest, VerifyCodeRequest},
    services::events::{EventBus, Route},
    views::already_reported,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecoveryStep {
    EnterEmail = 1,
    EnterCode = 2,
    NewPassword = 3,
    Done = 4,
}

impl RecoveryStep {
    fn previous(self) -> Self {
        match self {
            RecoveryStep::EnterEmail | RecoveryStep::EnterCode => RecoveryStep::EnterEmail,
            RecoveryStep::NewPassword => RecoveryStep::EnterCode,
            RecoveryStep::Done => RecoveryStep::NewPassword,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecoveryForm {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub struct ForgotPasswordView {
    gateway: Gateway,
    events: EventBus,
    pub step: RecoveryStep,
    pub form: RecoveryForm,
    pub busy: bool,
}

impl ForgotPasswordView {
    pub fn new(gateway: Gateway, events: EventBus) -> Self {
        Self {
            gateway,
            events,
            step: RecoveryStep::EnterEmail,
            form: RecoveryForm::default(),
            busy: false,
        }
    }

    pub async fn send_code(&mut self) -> AppResult<()> {
        self.request_code("Send failed").await?;
        self.events
            .notify(Notice::Success("Verification code sent, check your inbox".to_string()));
        self.step = RecoveryStep::EnterCode;
        Ok(())
    }

    pub async fn resend_code(&mut self) -> AppResult<()> {
        self.request_code("Send failed").await?;
        self.events.notify(Notice::Success("Verification code sent again".to_string()));
        Ok(())
    }

    pub async fn verify_code(&mut self) -> AppResult<()> {
        let request = VerifyCodeRequest {
            email: self.form.email.trim().to_string(),
            code: self.form.code.trim().to_string(),
        };
        request.validate()?;

        self.busy = true;
        let result = api::auth::verify_reset_code(&self.gateway, &request).await;
        self.busy = false;
        self.surface(result, "Verification failed")?;

        self.events.notify(Notice::Success("Code verified".to_string()));
        self.step = RecoveryStep::NewPassword;
        Ok(())
    }

    pub async fn reset_password(&mut self) -> AppResult<()> {
        if self.form.new_password != self.form.confirm_password {
            return Err(AppError::Validation("passwords do not match".to_string()));
        }
        let request = PasswordResetRequest {
            email: self.form.email.trim().to_string(),
            code: self.form.code.trim().to_string(),
            new_password: self.form.new_password.clone(),
        };
        request.validate()?;

        self.busy = true;
        let result = api::auth::reset_password(&self.gateway, &request).await;
        self.busy = false;
        self.surface(result, "Reset failed")?;

        tracing::info!(email = %request.email, "password reset");
        self.events.notify(Notice::Success("Password reset".to_string()));
        self.step = RecoveryStep::Done;
        Ok(())
    }

    pub fn previous_step(&mut self) {
        self.step = self.step.previous();
    }

    pub fn go_to_login(&self) {
        self.events.navigate(Route::Login);
    }

    async fn request_code(&mut self, action: &str) -> AppResult<()> {
        let request = EmailRequest {
            email: self.form.email.trim().to_string(),
        };
        request.validate()?;

        self.busy = true;
        let result = api::auth::send_reset_code(&self.gateway, &request).await;
        self.busy = false;
        self.surface(result, action)
    }

    /// Report a failed step with the server's reason
    fn surface<T>(&self, result: AppResult<T>, action: &str) -> AppResult<()> {
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if !already_reported(&e) {
                    self.events
                        .notify(Notice::Error(format!("{}: {}", action, e.user_message())));
                }
                Err(e)
            }
        }
    }
}
