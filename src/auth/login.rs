use axum::{debug_handler, extract::State, response::IntoResponse, Json};

use crate::{appresult::success, relay::Relay, AppResult, RelayError, RelayResult};

use super::Credentials;

/// Checks the credentials and that nobody is online under this number. The
/// relay re-checks the latter on `join`, since a session can open in between.
pub async fn login(relay: &Relay, Credentials { phone, password, .. }: Credentials) -> RelayResult<()> {
    let Some(account) = relay.store.get_account(&phone).await? else {
        return Err(RelayError::NotFound);
    };

    if account.password != password {
        return Err(RelayError::InvalidCredential);
    }

    if relay.registry.lookup(&phone).is_some() {
        return Err(RelayError::AlreadyLoggedIn);
    }

    Ok(())
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login_handler(
    State(relay): State<Relay>,
    Json(credentials): Json<Credentials>,
) -> AppResult<impl IntoResponse> {
    login(&relay, credentials).await?;
    Ok(success())
}
