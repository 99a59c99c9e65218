pub use super::referral_requests::Entity as ReferralRequests;
pub use super::users::Entity as Users;
