//! Account endpoints: login, registration, password recovery

use super::Gateway;
use crate::{
    error::AppResult,
    models::user::{
        Credentials, EmailRequest, LoginResponse, MessageResponse, PasswordResetRequest, RegisterRequest,
        RegisterResponse, VerifyCodeRequest,
    },
};

pub async fn login(gateway: &Gateway, credentials: &Credentials) -> AppResult<LoginResponse> {
    gateway.post("/login", credentials).await
}

pub async fn register(gateway: &Gateway, request: &RegisterRequest) -> AppResult<RegisterResponse> {
    gateway.post("/register", request).await
}

pub async fn send_verification_code(gateway: &Gateway, request: &EmailRequest) -> AppResult<MessageResponse> {
    gateway.post("/send-verification-code", request).await
}

pub async fn send_reset_code(gateway: &Gateway, request: &EmailRequest) -> AppResult<MessageResponse> {
    gateway.post("/forgot-password/send-code", request).await
}

pub async fn verify_reset_code(gateway: &Gateway, request: &VerifyCodeRequest) -> AppResult<MessageResponse> {
    gateway.post("/forgot-password/verify-code", request).await
}

pub async fn reset_password(gateway: &Gateway, request: &PasswordResetRequest) -> AppResult<MessageResponse> {
    gateway.post("/forgot-password/reset", request).await
}
