//! DTO definitions used by the admin login flow.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Credentials posted by the login form.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(max = 128))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_credentials_fail_validation() {
        let form = LoginForm {
            username: "a".repeat(129),
            password: "1234".into(),
        };
        assert!(form.validate().is_err());
        assert!(LoginForm::default().validate().is_ok());
    }
}
