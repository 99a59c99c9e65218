pub mod identity_service;
pub use identity_service::{IdentityError, IdentityProvider, VerifiedIdentity};

pub mod user_service;
pub use user_service::{DeletionReport, ProfileUpdate, UserError, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;

pub mod referral_service;
pub use referral_service::{CreateReferral, ReferralError, ReferralService};

pub mod referral_service_impl;
pub use referral_service_impl::SeaOrmReferralService;
