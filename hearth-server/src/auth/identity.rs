use axum::http::{HeaderMap, header};
use tracing::warn;

use hearth_model::UserId;

use crate::infra::app_state::AppState;
use crate::infra::errors::{AppError, AppResult};

/// Resolve the caller's identity for an owner check.
///
/// A valid bearer token wins. Without one, the client-asserted identifier
/// from the request body is trusted as-is, which keeps token-less clients
/// working but makes mutation only as safe as the client is honest. A
/// token that is present but invalid is rejected outright rather than
/// falling back.
pub fn caller_identity(
    state: &AppState,
    headers: &HeaderMap,
    asserted: UserId,
) -> AppResult<UserId> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        warn!("no bearer token on mutating request; trusting client-asserted identity {asserted}");
        return Ok(asserted);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("malformed Authorization header"))?;
    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| AppError::unauthorized("invalid or expired token"))?;

    Ok(UserId(claims.sub))
}
