use super::ApiError;
use crate::domain::ReferralStatus;

pub fn validate_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn parse_status(value: &str) -> Result<ReferralStatus, ApiError> {
    value
        .parse::<ReferralStatus>()
        .map_err(|e| ApiError::validation(e.to_string()))
}

/// Sign-in methods the token exchange endpoint accepts.
pub fn validate_provider(provider: &str) -> Result<&str, ApiError> {
    match provider {
        "google" | "email" => Ok(provider),
        other => Err(ApiError::validation(format!(
            "Unsupported sign-in provider: {other}"
        ))),
    }
}

pub fn validate_company_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Company name cannot be empty"));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("referral", 1).is_ok());
        assert!(validate_id("referral", 0).is_err());
        assert!(validate_id("user", -3).is_err());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("hired").unwrap(), ReferralStatus::Hired);
        assert!(matches!(
            parse_status("archived"),
            Err(ApiError::ValidationError(msg)) if msg == "Invalid status: archived"
        ));
    }

    #[test]
    fn test_validate_provider() {
        assert!(validate_provider("google").is_ok());
        assert!(validate_provider("email").is_ok());
        assert!(validate_provider("github").is_err());
    }

    #[test]
    fn test_validate_company_name() {
        assert_eq!(validate_company_name("  Acme ").unwrap(), "Acme");
        assert!(validate_company_name("  ").is_err());
    }
}
