//! Demo login
//!
//! Local, unvalidated identity: no credentials are checked or stored.

use crate::error::LoginError;
use crate::models::{SessionContext, User};
use regex::Regex;
use tracing::info;

lazy_static::lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"\S+@\S+\.\S+").unwrap();
}

/// Turn the login form into a session user. The password is discarded.
pub fn login(name: &str, email: &str, password: &str) -> Result<User, LoginError> {
    if name.trim().is_empty() || email.trim().is_empty() || password.trim().is_empty() {
        return Err(LoginError::MissingFields);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(LoginError::InvalidEmail);
    }

    info!(name = %name.trim(), "User signed in");

    Ok(User {
        name: name.to_string(),
        email: email.to_string(),
    })
}

pub fn logout(context: &mut SessionContext) {
    if let Some(user) = context.user.take() {
        info!(name = %user.name, "User signed out");
    }
}
