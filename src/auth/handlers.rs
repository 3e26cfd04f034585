// HTTP handlers for authentication endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use crate::auth::{
    cookie::{cleared_cookie, read_cookie, session_cookie, ACCESS_COOKIE, REFRESH_COOKIE},
    error::AuthError,
    middleware::access_token_from_headers,
    models::{AuthResponse, IssuedTokens, LoginRequest, MessageResponse, RefreshResponse, SignupRequest},
    service::AuthService,
};
use std::sync::Arc;
use validator::Validate;

/// Unwrap a JSON body, reporting a malformed one as an auth validation error
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    body.map(|Json(request)| request)
        .map_err(|rejection| AuthError::ValidationError(rejection.body_text()))
}

fn token_cookies(tokens: &IssuedTokens) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    AppendHeaders([
        (header::SET_COOKIE, session_cookie(ACCESS_COOKIE, &tokens.access_token)),
        (header::SET_COOKIE, session_cookie(REFRESH_COOKIE, &tokens.refresh_token)),
    ])
}

/// Register a new user
/// POST /auth/signup
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered, token and refreshToken cookies set", body = AuthResponse),
        (status = 400, description = "User already exists or invalid input", body = String, example = json!({"error": "User already exists", "code": "ALREADY_EXISTS"}))
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let request = json_body(body)?;
    request
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let tokens = service.signup(&request.username, &request.password).await?;

    let body = AuthResponse {
        message: "User registered successfully".to_string(),
        jwt: tokens.access_token.clone(),
    };
    Ok((StatusCode::CREATED, token_cookies(&tokens), Json(body)))
}

/// Login a user
/// POST /auth/login
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated, token and refreshToken cookies set", body = AuthResponse),
        (status = 400, description = "Malformed request body", body = String, example = json!({"error": "Failed to deserialize the JSON body", "code": "VALIDATION_ERROR"})),
        (status = 401, description = "Invalid credentials", body = String, example = json!({"error": "Invalid credentials", "code": "INVALID_CREDENTIALS"}))
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let request = json_body(body)?;

    let tokens = service.login(&request.username, &request.password).await?;

    let body = AuthResponse {
        message: "Authenticated".to_string(),
        jwt: tokens.access_token.clone(),
    };
    Ok((StatusCode::OK, token_cookies(&tokens), Json(body)))
}

/// Exchange the refreshToken cookie for a new access token
/// GET /auth/refresh
#[utoipa::path(
    get,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New access token issued, token cookie set", body = RefreshResponse),
        (status = 401, description = "No refresh token provided", body = String, example = json!({"error": "No refresh token provided", "code": "UNAUTHENTICATED"})),
        (status = 403, description = "Invalid refresh token", body = String, example = json!({"error": "Invalid refresh token", "code": "FORBIDDEN"}))
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    let token = service.refresh(read_cookie(&headers, REFRESH_COOKIE)).await?;

    let cookie = AppendHeaders([(header::SET_COOKIE, session_cookie(ACCESS_COOKIE, &token))]);
    Ok((cookie, Json(RefreshResponse { token })))
}

/// Revoke the caller's sessions and clear both cookies
/// POST /auth/logout
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out, cookies cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AuthError> {
    // A malformed Authorization header just means no identity
    let access_token = access_token_from_headers(&headers).ok().flatten();
    let refresh_token = read_cookie(&headers, REFRESH_COOKIE);

    let caller = service.identify_caller(access_token, refresh_token).await?;
    service.logout(caller.as_deref()).await?;

    let cookies = AppendHeaders([
        (header::SET_COOKIE, cleared_cookie(ACCESS_COOKIE)),
        (header::SET_COOKIE, cleared_cookie(REFRESH_COOKIE)),
    ]);
    Ok((
        cookies,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}
