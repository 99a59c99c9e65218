//! List users command handler

use crate::config::Config;
use crate::domain::UserRole;
use crate::state::SharedState;

pub async fn cmd_list_users(
    config: &Config,
    role: Option<&str>,
    employees_only: bool,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let users = &state.user_service;

    let mut accounts = if employees_only {
        users.list_employees().await?
    } else {
        let roles = match role {
            Some(role) => vec![role.parse::<UserRole>()?],
            None => vec![UserRole::Admin, UserRole::Regular],
        };
        let mut all = Vec::new();
        for role in roles {
            all.extend(users.list_by_role(role).await?);
        }
        all
    };
    accounts.sort_by_key(|u| u.id);

    if accounts.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    println!("Accounts ({} total)", accounts.len());
    println!("{:-<70}", "");

    for user in accounts {
        let verified = if user.email_verified { "✓" } else { "✗" };
        println!(
            "{:>5}  {:<32} {:<8} {} {}",
            user.id.value(),
            user.email,
            user.role.as_str(),
            verified,
            user.company_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
