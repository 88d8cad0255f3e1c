use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::{debug, warn};

use palette_db::models::UserRow;
use palette_types::api::Claims;

use crate::error::ApiError;
use crate::run_blocking;
use crate::state::AppState;

/// Validate the bearer token in `headers` against the shared HS256 secret.
pub fn decode_claims(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let Authorization(bearer) = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized)?;

    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}

/// Whether the user row is missing or the token carries profile fields the
/// row doesn't have yet. Keeps plain reads off the writer connection.
fn needs_sync(existing: Option<&UserRow>, claims: &Claims) -> bool {
    let Some(row) = existing else {
        return true;
    };
    let changed = |claimed: &Option<String>, stored: &Option<String>| {
        claimed.is_some() && claimed != stored
    };
    changed(&claims.username, &row.username) || changed(&claims.email, &row.email)
}

/// Extract and validate JWT from Authorization header, making sure the user
/// has a row before any handler writes against it.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = decode_claims(req.headers(), &state.jwt_secret)?;

    let db = state.clone();
    let user = claims.clone();
    run_blocking(move || {
        let existing = db.db.get_user(&user.sub)?;
        if needs_sync(existing.as_ref(), &user) {
            db.db
                .ensure_user(&user.sub, user.username.as_deref(), user.email.as_deref())?;
        }
        Ok(())
    })
    .await?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must run inside `require_auth`.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .cloned()
        .ok_or(ApiError::Unauthorized)?;

    let db = state.clone();
    let user_id = claims.sub.clone();
    let user = run_blocking(move || Ok(db.db.get_user(&user_id)?)).await?;

    match user {
        Some(user) if user.is_admin && !user.is_deleted => Ok(next.run(req).await),
        _ => {
            warn!("Non-admin user {} denied admin route {}", claims.sub, req.uri().path());
            Err(ApiError::Forbidden("Forbidden: Admin access required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(username: Option<&str>, email: Option<&str>) -> Claims {
        Claims {
            sub: "user_1".to_string(),
            exp: 0,
            username: username.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    fn row(username: Option<&str>, email: Option<&str>) -> UserRow {
        UserRow {
            id: "user_1".to_string(),
            email: email.map(str::to_string),
            username: username.map(str::to_string),
            first_name: None,
            last_name: None,
            image_url: None,
            is_admin: false,
            is_deleted: false,
            created_at: "2024-05-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn missing_user_is_written() {
        assert!(needs_sync(None, &claims(None, None)));
    }

    #[test]
    fn known_user_with_same_profile_is_read_only() {
        let stored = row(Some("ash"), Some("ash@example.com"));
        assert!(!needs_sync(Some(&stored), &claims(Some("ash"), Some("ash@example.com"))));
        // absent claims never clear stored fields
        assert!(!needs_sync(Some(&stored), &claims(None, None)));
    }

    #[test]
    fn new_profile_fields_are_written() {
        let stored = row(Some("ash"), None);
        assert!(needs_sync(Some(&stored), &claims(Some("ash"), Some("ash@example.com"))));
        assert!(needs_sync(Some(&stored), &claims(Some("red"), None)));
    }
}
