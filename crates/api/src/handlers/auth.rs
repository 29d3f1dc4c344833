//! Handlers for the `/auth` resource: accounts, sessions, email links.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use fibervision_core::auth_rules::{
    token_identifier, ForgotPasswordInput, LoginInput, ResetPasswordInput, SignupInput,
    EMAIL_VERIFICATION_PREFIX, LOCKOUT_MINUTES, MAX_FAILED_LOGINS, PASSWORD_RESET_PREFIX,
};
use fibervision_core::error::CoreError;
use fibervision_core::roles::{Role, DEFAULT_ROLE};
use fibervision_core::types::{DbId, Timestamp};
use fibervision_db::models::session::CreateSession;
use fibervision_db::models::user::{CreateUser, User, UserResponse};
use fibervision_db::models::verification_token::CreateVerificationToken;
use fibervision_db::repositories::{RoleRepo, SessionRepo, UserRepo, VerificationTokenRepo};
use fibervision_mail::templates::{password_reset_email, verification_email};
use fibervision_mail::OutgoingEmail;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_opaque_token, hash_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/verify-email`.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Request body for `POST /auth/resend-verification`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResendVerificationRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

/// Query string for `GET /auth/verify-reset-token`.
#[derive(Debug, Deserialize)]
pub struct ResetTokenQuery {
    pub token: Option<String>,
}

/// Response of `GET /auth/verify-reset-token`.
#[derive(Debug, Serialize)]
pub struct ResetTokenStatus {
    pub valid: bool,
}

/// Successful authentication response returned by signup, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an account and sign it in. The very first account becomes an
/// admin. A verification email is sent; sign-in does not wait for it.
pub async fn signup(
    State(state): State<AppState>,
    Json(mut input): Json<SignupInput>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input.email = normalize_email(&input.email);
    input.check()?;

    let role = if UserRepo::count(&state.pool).await? == 0 {
        Role::Admin
    } else {
        DEFAULT_ROLE
    };
    let role_row = RoleRepo::find(&state.pool, role)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{role}' is not seeded")))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            username: input.username,
            email: input.email,
            password_hash,
            role_id: role_row.id,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %role, "User signed up");

    send_verification(&state, &user).await?;

    let response = create_auth_response(&state, &user, role.as_str()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(mut input): Json<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    ensure_not_banned(&user)?;

    if let Some(locked_until) = user.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        UserRepo::increment_failed_login(&state.pool, user.id).await?;

        let new_count = user.failed_login_count + 1;
        if new_count >= MAX_FAILED_LOGINS {
            let lock_until = Utc::now() + Duration::minutes(LOCKOUT_MINUTES);
            UserRepo::lock_account(&state.pool, user.id, lock_until).await?;
            tracing::warn!(user_id = user.id, "Account locked after repeated failed logins");
        }

        return Err(invalid_credentials());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;

    tracing::info!(user_id = user.id, "User logged in");

    let response = create_auth_response(&state, &user, &role_name).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new access + refresh token pair. The
/// presented token is consumed, so replaying it fails with 401.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_token(&input.refresh_token);

    let session = SessionRepo::claim(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    ensure_not_banned(&user)?;

    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let response = create_auth_response(&state, &user, &role_name).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// The signed-in user's profile.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(auth_user): RequireAuth,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, role_name),
    }))
}

/// POST /api/v1/auth/verify-email
///
/// Consume an email verification token. Returns 204 No Content.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(input): Json<VerifyEmailRequest>,
) -> AppResult<StatusCode> {
    let identifier = token_identifier(EMAIL_VERIFICATION_PREFIX, &hash_token(&input.token));
    let token = VerificationTokenRepo::consume(&state.pool, &identifier)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired verification link".into()))?;

    UserRepo::mark_email_verified(&state.pool, token.user_id).await?;
    tracing::info!(user_id = token.user_id, "Email verified");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/resend-verification
///
/// Send a fresh verification link. Always 204, whether or not the address
/// belongs to an account.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(mut input): Json<ResendVerificationRequest>,
) -> AppResult<StatusCode> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    if let Some(user) = UserRepo::find_by_email(&state.pool, &input.email).await? {
        if !user.email_verified && !user.banned {
            send_verification(&state, &user).await?;
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/forgot-password
///
/// Email a password reset link. Always 204 so the response does not reveal
/// which addresses have accounts.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut input): Json<ForgotPasswordInput>,
) -> AppResult<StatusCode> {
    input.email = normalize_email(&input.email);
    input.validate()?;

    let Some(user) = UserRepo::find_by_email(&state.pool, &input.email).await? else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(StatusCode::NO_CONTENT);
    };
    if user.banned {
        return Ok(StatusCode::NO_CONTENT);
    }

    let expiry_mins = state.config.reset_token_expiry_mins;
    let token = issue_token(
        &state,
        user.id,
        PASSWORD_RESET_PREFIX,
        Utc::now() + Duration::minutes(expiry_mins),
    )
    .await?;

    let url = format!("{}/auth/reset-password?token={token}", state.config.app_url);
    deliver(&state, password_reset_email(&user.email, &user.name, &url, expiry_mins)).await;

    tracing::info!(user_id = user.id, "Password reset link issued");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/verify-reset-token?token=
///
/// Whether a reset token is still usable. Does not consume it.
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Query(query): Query<ResetTokenQuery>,
) -> AppResult<Json<ResetTokenStatus>> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Token is required".into()))?;

    let identifier = token_identifier(PASSWORD_RESET_PREFIX, &hash_token(&token));
    let valid = VerificationTokenRepo::find_valid(&state.pool, &identifier)
        .await?
        .is_some();
    Ok(Json(ResetTokenStatus { valid }))
}

/// POST /api/v1/auth/reset-password
///
/// Consume a reset token and set a new password. Every existing session is
/// revoked. Returns 204 No Content.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordInput>,
) -> AppResult<StatusCode> {
    input.check()?;

    let identifier = token_identifier(PASSWORD_RESET_PREFIX, &hash_token(&input.token));
    let token = VerificationTokenRepo::consume(&state.pool, &identifier)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired reset link".into()))?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, token.user_id, &password_hash).await?;
    SessionRepo::revoke_all_for_user(&state.pool, token.user_id).await?;

    tracing::info!(user_id = token.user_id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

fn ensure_not_banned(user: &User) -> AppResult<()> {
    if !user.banned {
        return Ok(());
    }
    let message = match &user.ban_reason {
        Some(reason) => format!("Account is banned: {reason}"),
        None => "Account is banned".to_string(),
    };
    Err(AppError::Core(CoreError::Forbidden(message)))
}

/// Replace any outstanding token of this purpose with a fresh one and
/// return its plaintext.
async fn issue_token(
    state: &AppState,
    user_id: DbId,
    prefix: &str,
    expires_at: Timestamp,
) -> AppResult<String> {
    VerificationTokenRepo::delete_for_user(&state.pool, user_id, prefix).await?;

    let (plaintext, hash) = generate_opaque_token();
    VerificationTokenRepo::create(
        &state.pool,
        &CreateVerificationToken {
            identifier: token_identifier(prefix, &hash),
            user_id,
            expires_at,
        },
    )
    .await?;
    Ok(plaintext)
}

async fn send_verification(state: &AppState, user: &User) -> AppResult<()> {
    let expiry_hours = state.config.verification_token_expiry_hours;
    let token = issue_token(
        state,
        user.id,
        EMAIL_VERIFICATION_PREFIX,
        Utc::now() + Duration::hours(expiry_hours),
    )
    .await?;

    let url = format!("{}/auth/verify-email?token={token}", state.config.app_url);
    deliver(state, verification_email(&user.email, &user.name, &url, expiry_hours)).await;
    Ok(())
}

/// Send an email, logging (not surfacing) delivery failures.
async fn deliver(state: &AppState, email: OutgoingEmail) {
    let to = email.to.clone();
    if let Err(e) = state.mailer.send(email).await {
        tracing::error!(to = %to, error = %e, "Failed to send email");
    }
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: &User, role: &str) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_opaque_token();
    let expires_at = Utc::now() + Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            role: role.to_string(),
        },
    })
}
