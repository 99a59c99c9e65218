pub mod prelude;

pub mod referral_requests;
pub mod users;
