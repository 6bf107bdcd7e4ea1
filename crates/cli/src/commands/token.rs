//! Token commands.

use grocery_core::Email;
use grocery_server::services::ServiceError;

use super::{CommandError, connect};

/// Print a bearer token for the account registered under `email`.
///
/// # Errors
///
/// Returns `CommandError::Service` if the email is invalid or unknown.
pub async fn issue(email: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(ServiceError::from)?;
    let state = connect().await?;

    let mut tx = state.store().begin().await.map_err(ServiceError::from)?;
    let (account, _) = tx
        .find_account_by_email(&email)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::NotFound(format!("account {email}")))?;
    drop(tx);

    let token = state.tokens().issue(&account).map_err(ServiceError::from)?;

    tracing::info!(account_id = %account.id, expires_in = token.expires_in, "Issued token");
    #[allow(clippy::print_stdout)]
    {
        println!("{}", token.access_token);
    }
    Ok(())
}
