//! Account management commands.

use grocery_server::services::Registration;

use super::{CommandError, connect};

/// Register an account directly against the database.
///
/// # Errors
///
/// Returns `CommandError::Service` for invalid input or a taken name/email.
pub async fn create(name: String, email: String, password: String) -> Result<(), CommandError> {
    let state = connect().await?;

    let account = state
        .accounts()
        .register(Registration {
            name,
            email,
            password,
        })
        .await?;

    tracing::info!(
        account_id = %account.id,
        "Created account {} <{}>",
        account.name,
        account.email
    );
    Ok(())
}
