//! Company referrals command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_company_referrals(config: &Config, company: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let requests = state.referral_service.list_by_company(company).await?;

    if requests.is_empty() {
        println!("No referral requests for {company}.");
        return Ok(());
    }

    println!("Referral requests for {} ({} total)", company, requests.len());
    println!("{:-<70}", "");

    for r in requests {
        let employee = r
            .employee_id
            .map_or_else(|| "unclaimed".to_string(), |id| format!("employee {id}"));
        let rating = r.rating.map(|n| format!(" ★{n}")).unwrap_or_default();

        println!("#{} {} [{}]{}", r.id, r.job_title, r.status, rating);
        println!("  Job seeker: {} | {} | Created: {}", r.job_seeker_id, employee, r.created_at);
    }

    Ok(())
}
