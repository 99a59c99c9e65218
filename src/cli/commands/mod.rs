mod admin;
mod referrals;
mod users;

pub use admin::cmd_set_role;
pub use referrals::cmd_company_referrals;
pub use users::cmd_list_users;
