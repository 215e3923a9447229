//! Identity endpoints: upsert-on-login issuance and profile reads.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use taskd_auth::IdentityClaims;
use taskd_core::User;
use taskd_storage::{NewUser, StorageError};

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub token: String,
    pub user: User,
}

/// `POST /auth/identify` - find or create a user and issue a credential.
///
/// There is no password step: presenting an email claims that identity
/// and yields a signed token for it. Repeat calls for a known email reuse
/// the stored user rather than creating a duplicate.
pub async fn identify(
    State(state): State<AppState>,
    Json(req): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>, ApiError> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_ascii_lowercase();

    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::validation("a valid email is required"));
    }

    let user = match state.users.find_by_email(&email).await? {
        Some(user) => user,
        None => match state.users.create(NewUser::new(&name, &email)).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "user created");
                user
            }
            // Concurrent identify for the same email; the other writer won.
            Err(StorageError::AlreadyExists { .. }) => state
                .users
                .find_by_email(&email)
                .await?
                .ok_or_else(|| ApiError::Internal("user vanished after conflict".into()))?,
            Err(e) => return Err(e.into()),
        },
    };

    let token = state.tokens.issue(&user)?;

    Ok(Json(IdentifyResponse { token, user }))
}

/// `GET /auth/me` - the profile behind the presented credential.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<IdentityClaims>,
) -> Result<Json<User>, ApiError> {
    state
        .users
        .find_by_id(claims.sub)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("user {} not found", claims.sub)))
}
