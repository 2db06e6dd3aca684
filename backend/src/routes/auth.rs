use std::sync::Arc;

use aide::OperationIo;
use axum::{
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
    Extension, Json,
};
use common_types::{LoginRequest, SuccessResponse};
use tracing::{info, instrument, warn};

use crate::{
    session::{SessionError, SessionManager},
    types::AppError,
};

/// `{success: true}` together with a `Set-Cookie` header
#[derive(Debug, OperationIo)]
#[aide(output_with = "axum::Json<SuccessResponse>")]
pub struct SessionCookie(String);

impl IntoResponse for SessionCookie {
    fn into_response(self) -> Response {
        ([(SET_COOKIE, self.0)], Json(SuccessResponse::OK)).into_response()
    }
}

/// Exchanges the shared access password for a session cookie
#[instrument(skip_all)]
pub async fn login(
    Extension(sessions): Extension<Arc<SessionManager>>,
    Json(request): Json<LoginRequest>,
) -> Result<SessionCookie, AppError> {
    let marker = sessions.login(&request.password).map_err(|err| {
        if matches!(err, SessionError::InvalidPassword) {
            warn!("Login attempt with a wrong password");
        }
        err
    })?;

    info!("Session issued");
    Ok(SessionCookie(sessions.session_cookie(&marker)))
}

/// Clears the session cookie
///
/// Markers are stateless, so a copied marker stays valid until it expires.
#[allow(clippy::unused_async)]
pub async fn logout(Extension(sessions): Extension<Arc<SessionManager>>) -> SessionCookie {
    SessionCookie(sessions.cleared_cookie())
}
