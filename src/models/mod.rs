pub mod referral;
pub mod user;
