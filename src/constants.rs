pub mod identity {
    pub const FIREBASE_JWKS_URL: &str =
        "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

    pub const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

    pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

    pub const USER_AGENT: &str = "ReferralPlatform/1.0";
}

pub mod referrals {

    pub const MIN_RATING: i32 = 1;

    pub const MAX_RATING: i32 = 5;
}

pub mod limits {

    pub const MAX_TEXT_FIELD_LEN: usize = 255;

    pub const MAX_LINK_LEN: usize = 2048;
}
