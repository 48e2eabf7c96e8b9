//! Authentication: signup/login endpoints, bearer tokens and the middleware
//! that turns a token into an [`engine::Principal`].
//!
//! Tokens are opaque (random UUID, base64), held in an in-memory store with a
//! fixed TTL. Every authenticated request re-reads the user row, so a
//! deactivated or deleted account loses access immediately.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use api_types::{
    ApiResponse,
    auth::{LoginRequest, SignupRequest, TokenResponse},
    user::UserView,
};
use axum::{
    Extension, Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use base64::Engine as _;
use engine::{EngineError, NewUser, Principal, Role};
use sea_orm::{DatabaseConnection, entity::prelude::*};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

const TOKEN_TTL: Duration = Duration::from_secs(30 * 60);
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
const RATE_LIMIT_MAX: u32 = 5;

/// Narrow view of the `users` table, just what authentication needs.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email: String,
    pub password: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

struct TokenEntry {
    user_id: i32,
    expires_at: Instant,
}

/// Credential and token verification, kept out of the engine on purpose: the
/// engine only ever consumes an already-built [`Principal`].
pub struct AuthProvider {
    db: DatabaseConnection,
    tokens: Mutex<HashMap<String, TokenEntry>>,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl AuthProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            tokens: Mutex::new(HashMap::new()),
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Fixed-window limiter keyed by email, shared by signup and login.
    fn check_rate_limit(&self, email: &str) -> Result<(), ServerError> {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let window = windows
            .entry(email.trim().to_lowercase())
            .or_insert((now, 0));
        if now.duration_since(window.0) >= RATE_LIMIT_WINDOW {
            *window = (now, 0);
        }
        window.1 += 1;
        if window.1 > RATE_LIMIT_MAX {
            return Err(ServerError::RateLimited);
        }
        Ok(())
    }

    /// Checks credentials and issues a fresh bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ServerError> {
        let email = email.trim().to_lowercase();
        let user = Entity::find()
            .filter(Column::Email.eq(&email))
            .one(&self.db)
            .await
            .map_err(EngineError::from)?;

        let user = match user {
            Some(user) if user.is_active && user.password == password => user,
            _ => return Err(ServerError::Unauthorized),
        };

        let token = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(Uuid::new_v4().as_bytes());
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                token.clone(),
                TokenEntry {
                    user_id: user.id,
                    expires_at: Instant::now() + TOKEN_TTL,
                },
            );

        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: TOKEN_TTL.as_secs(),
        })
    }

    /// Resolves a bearer token into a [`Principal`].
    ///
    /// Expired tokens are dropped from the store; the user row is re-read so
    /// role changes and deactivation apply without waiting for expiry.
    pub async fn authenticate(&self, token: &str) -> Option<Principal> {
        let user_id = {
            let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
            match tokens.get(token) {
                Some(entry) if entry.expires_at > Instant::now() => entry.user_id,
                Some(_) => {
                    tokens.remove(token);
                    return None;
                }
                None => return None,
            }
        };

        let user = Entity::find_by_id(user_id).one(&self.db).await.ok()??;
        if !user.is_active {
            return None;
        }
        let role = Role::try_from(user.role.as_str()).ok()?;
        Some(Principal { id: user.id, role })
    }
}

pub async fn require_bearer(
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let principal = state
        .auth
        .authenticate(header.token())
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Handle account registration.
pub async fn signup(
    State(state): State<ServerState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ServerError> {
    state.auth.check_rate_limit(&payload.email)?;

    let user = state
        .engine
        .signup(NewUser {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("user registered", UserView::from(user))),
    ))
}

/// Handle credential login, returning a bearer token.
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ServerError> {
    state.auth.check_rate_limit(&payload.email)?;
    let token = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(ApiResponse::ok("login successful", token)))
}

/// Return the authenticated user's profile.
pub async fn me(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
) -> Result<Json<ApiResponse<UserView>>, ServerError> {
    let user = state.engine.profile(&principal).await?;
    Ok(Json(ApiResponse::ok("authenticated", UserView::from(user))))
}
