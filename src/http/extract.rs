use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::application::AppError;
use crate::auth::authorize;
use crate::domain::Principal;

use super::AppState;

/// The authenticated card owner making the request.
///
/// Rejects with 401 when credentials are missing or wrong and with 403
/// when the user lacks the card owner role.
pub struct CardOwner(pub Principal);

impl FromRequestParts<Arc<AppState>> for CardOwner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let principal = state.users.authenticate(header)?;
        authorize(&principal)?;
        Ok(CardOwner(principal))
    }
}
