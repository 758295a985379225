use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::models::AccountView;
use crate::routes::{AppJson, CurrentAccount};
use crate::AppState;

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Account plus a freshly issued access token
#[derive(Serialize)]
pub struct SessionResponse {
    pub account: AccountView,
    pub token: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Register a new account
///
/// Returns 201 with the account and its first access token, or 409 if the
/// email is already registered.
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let registration = state
        .accounts
        .register(
            &payload.email,
            &payload.first_name,
            &payload.last_name,
            &payload.password,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            account: registration.account.to_public_view(),
            token: registration.token,
        }),
    ))
}

/// Sign in with email and password
///
/// Issues a new token on success; any token issued earlier stops working.
/// Unknown email and wrong password produce the same 401 response.
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SignInRequest>,
) -> Result<Json<SessionResponse>> {
    let account = state
        .accounts
        .authenticate(&payload.email, &payload.password)
        .await?;
    let token = state
        .accounts
        .issue_token(&account, state.config.token_bytes)
        .await?;

    Ok(Json(SessionResponse {
        account: account.to_public_view(),
        token,
    }))
}

/// Current account's profile
pub async fn profile(CurrentAccount(account): CurrentAccount) -> Json<AccountView> {
    Json(account.to_public_view())
}

/// Rotate the caller's access token
pub async fn rotate_token(
    State(state): State<AppState>,
    CurrentAccount(account): CurrentAccount,
) -> Result<Json<TokenResponse>> {
    let token = state
        .accounts
        .issue_token(&account, state.config.token_bytes)
        .await?;

    Ok(Json(TokenResponse { token }))
}
