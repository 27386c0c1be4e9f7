//! Input validation applied before login and signup requests are sent.

use super::models::{LoginRequest, SignUpRequest};
use crate::net::errors::{ApiError, ErrorDetails};

/// Username length bounds (inclusive)
pub const USERNAME_LEN: (usize, usize) = (3, 20);

/// Company name length bounds (inclusive)
pub const COMPANY_NAME_LEN: (usize, usize) = (2, 50);

/// Maximum email length
pub const MAX_EMAIL_LEN: usize = 100;

/// Minimum password length accepted at login
pub const MIN_LOGIN_PASSWORD_LEN: usize = 6;

/// Minimum password length required at signup
pub const MIN_SIGNUP_PASSWORD_LEN: usize = 8;

/// Validate a username: 3-20 ASCII letters, digits or underscores
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if username.is_empty() {
        return Err("Username is required".to_string());
    }
    if len < USERNAME_LEN.0 {
        return Err(format!("Username must be at least {} characters", USERNAME_LEN.0));
    }
    if len > USERNAME_LEN.1 {
        return Err(format!("Username must be at most {} characters", USERNAME_LEN.1));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err("Username may only contain letters, digits and underscores".to_string());
    }
    Ok(())
}

/// Validate an email address: `local@domain.tld` without whitespace
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(format!("Email must be at most {MAX_EMAIL_LEN} characters"));
    }

    let well_formed = !email.contains(char::is_whitespace)
        && email.matches('@').count() == 1
        && email.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });

    if !well_formed {
        return Err("Email address is not valid".to_string());
    }
    Ok(())
}

/// Validate a company name: 2-50 Hangul syllables, ASCII letters, digits or spaces
pub fn validate_company_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if name.trim().is_empty() {
        return Err("Company name is required".to_string());
    }
    if len < COMPANY_NAME_LEN.0 {
        return Err(format!(
            "Company name must be at least {} characters",
            COMPANY_NAME_LEN.0
        ));
    }
    if len > COMPANY_NAME_LEN.1 {
        return Err(format!(
            "Company name must be at most {} characters",
            COMPANY_NAME_LEN.1
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || is_hangul_syllable(c))
    {
        return Err("Company name may only contain Korean, letters, digits and spaces".to_string());
    }
    Ok(())
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Password strength assessment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    /// One point each for length, lowercase, uppercase, digit, symbol (0-5)
    pub score: u8,
    /// What is missing, in rule order
    pub hints: Vec<&'static str>,
}

impl PasswordStrength {
    /// Score 3 or more is acceptable
    pub fn is_acceptable(&self) -> bool {
        self.score >= 3
    }
}

/// Score a password against the five strength rules
pub fn password_strength(password: &str) -> PasswordStrength {
    let rules: [(bool, &'static str); 5] = [
        (
            password.chars().count() >= MIN_SIGNUP_PASSWORD_LEN,
            "use at least 8 characters",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "add a lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "add an uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "add a digit",
        ),
        (
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
            "add a symbol for a stronger password",
        ),
    ];

    PasswordStrength {
        score: rules.iter().filter(|(ok, _)| *ok).count() as u8,
        hints: rules
            .iter()
            .filter(|(ok, _)| !ok)
            .map(|(_, hint)| *hint)
            .collect(),
    }
}

/// Validate a signup password: 8+ characters with lowercase, uppercase and digit
pub fn validate_signup_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_SIGNUP_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_SIGNUP_PASSWORD_LEN} characters"
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err("Password must contain lowercase, uppercase and a digit".to_string());
    }
    Ok(())
}

/// Validate a login request
///
/// # Errors
///
/// Returns a `VALIDATION_ERROR` whose details list every failing field
pub fn validate_login(request: &LoginRequest) -> Result<(), ApiError> {
    let mut details = ErrorDetails::new();
    record(&mut details, "username", validate_username(&request.username));

    let password = if request.password.is_empty() {
        Err("Password is required".to_string())
    } else if request.password.chars().count() < MIN_LOGIN_PASSWORD_LEN {
        Err(format!(
            "Password must be at least {MIN_LOGIN_PASSWORD_LEN} characters"
        ))
    } else {
        Ok(())
    };
    record(&mut details, "password", password);

    finish(details)
}

/// Validate a signup request together with its password confirmation
///
/// # Errors
///
/// Returns a `VALIDATION_ERROR` whose details list every failing field
pub fn validate_signup(request: &SignUpRequest, confirm_password: &str) -> Result<(), ApiError> {
    let mut details = ErrorDetails::new();
    record(
        &mut details,
        "companyName",
        validate_company_name(&request.company_name),
    );
    record(&mut details, "username", validate_username(&request.username));
    record(&mut details, "email", validate_email(&request.email));
    record(
        &mut details,
        "password",
        validate_signup_password(&request.password),
    );

    let confirm = if confirm_password.is_empty() {
        Err("Password confirmation is required".to_string())
    } else if confirm_password != request.password {
        Err("Passwords do not match".to_string())
    } else {
        Ok(())
    };
    record(&mut details, "confirmPassword", confirm);

    finish(details)
}

fn record(details: &mut ErrorDetails, field: &str, outcome: Result<(), String>) {
    if let Err(message) = outcome {
        details.entry(field.to_string()).or_default().push(message);
    }
}

fn finish(details: ErrorDetails) -> Result<(), ApiError> {
    if details.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(details))
    }
}
