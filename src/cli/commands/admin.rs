//! Admin role command handler

use crate::config::Config;
use crate::domain::UserRole;
use crate::services::UserError;
use crate::state::SharedState;

pub async fn cmd_set_role(config: &Config, email: &str, role: UserRole) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let users = &state.user_service;

    let user = match users.get_by_email(email).await {
        Ok(user) => user,
        Err(UserError::NotFound) => {
            println!("No account with email {email}.");
            println!("The user must sign in once before a role can be assigned.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if user.role == role {
        println!("{} is already {}", user.email, role);
        return Ok(());
    }

    let updated = users.set_role(user.id, role).await?;
    println!("✓ {} is now {}", updated.email, updated.role);

    Ok(())
}
