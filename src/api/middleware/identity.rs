//! User identity cookie middleware.

use axum::{
    extract::{Request, State},
    http::{
        HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::application::services::identity_service::COOKIE_NAME;
use crate::domain::entities::UserId;
use crate::state::AppState;

/// Attaches a [`UserId`] to every request.
///
/// # Cookie Format
///
/// ```text
/// Cookie: token=<id>.<hex hmac>
/// ```
///
/// # Flow
///
/// 1. Extract the `token` cookie from the request
/// 2. Verify its signature via [`crate::application::services::IdentityService`]
/// 3. On a missing or invalid cookie, issue a fresh random id
/// 4. Insert the id as a request extension for handlers
/// 5. Re-issue the cookie on the response
///
/// Requests are never rejected.
pub async fn layer(State(st): State<AppState>, mut req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|cookie_header| cookie_header.to_str().ok())
        .find_map(|cookie_str| {
            cookie_str.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                match (parts.next(), parts.next()) {
                    (Some(COOKIE_NAME), Some(value)) => Some(value.to_string()),
                    _ => None,
                }
            })
        });

    let user_id = match presented.as_deref().and_then(|value| st.identity.verify(value)) {
        Some(user_id) => user_id,
        None => {
            let user_id = st.identity.issue();
            debug!(%user_id, tampered = presented.is_some(), "Issued new user id");
            user_id
        }
    };

    req.extensions_mut().insert::<UserId>(user_id);

    let mut response = next.run(req).await;

    match HeaderValue::from_str(&st.identity.set_cookie(user_id)) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "Failed to encode identity cookie"),
    }

    response
}
