//! UI string catalogs
//!
//! Strings are data supplied per language. English is built in; any other
//! language comes from a JSON catalog and falls back to English per key.

use crate::error::{LoginError, PlannerError, ValidationError};
use crate::models::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// How long each loading message stays on screen
pub const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Translations {
    pub app_title: String,
    pub header_welcome: String,
    pub error_generate_itinerary: String,
    pub error_shared_itinerary: String,
    pub form_error: String,
    pub form_budget_error_min: String,
    pub login_error_all_fields: String,
    pub login_error_invalid_email: String,
    pub itinerary_days_adventure: String,
    pub share_link_copied: String,
    pub share_link_failed: String,
    pub booking_confirmed_title: String,
    pub booking_confirmed_subtitle: String,
    pub booking_confirmed_message: String,
    pub booking_confirmed_generic: String,
    pub loading_messages: Vec<String>,
}

impl Default for Translations {
    fn default() -> Self {
        Self::english()
    }
}

impl Translations {
    pub fn english() -> Self {
        Self {
            app_title: "AI Trip Planner".to_string(),
            header_welcome: "Welcome, {name}".to_string(),
            error_generate_itinerary:
                "Sorry, we couldn't generate your itinerary. Please try again.".to_string(),
            error_shared_itinerary:
                "Could not load the shared itinerary. The link may be corrupted.".to_string(),
            form_error: "Please enter a destination and select at least one interest."
                .to_string(),
            form_budget_error_min: "Your budget must be at least ₹500.".to_string(),
            login_error_all_fields: "Please fill in all fields.".to_string(),
            login_error_invalid_email: "Please enter a valid email address.".to_string(),
            itinerary_days_adventure: "{days}-Day Adventure".to_string(),
            share_link_copied: "Link copied to clipboard!".to_string(),
            share_link_failed: "Failed to copy link.".to_string(),
            booking_confirmed_title: "Booking Confirmed!".to_string(),
            booking_confirmed_subtitle: "Get ready for your trip to {destination}.".to_string(),
            booking_confirmed_message:
                "A confirmation email with all your tickets and vouchers has been sent to {email}."
                    .to_string(),
            booking_confirmed_generic:
                "A confirmation email with all your tickets and vouchers has been sent."
                    .to_string(),
            loading_messages: vec![
                "Crafting your personalized adventure...".to_string(),
                "Finding hidden gems and local favourites...".to_string(),
                "Checking the best times to visit landmarks...".to_string(),
                "Balancing your budget across each day...".to_string(),
                "Almost there, packing the final details...".to_string(),
            ],
        }
    }

    /// Message for the given time spent loading, rotating every 2.5 s
    pub fn loading_message(&self, elapsed: Duration) -> Option<&str> {
        if self.loading_messages.is_empty() {
            return None;
        }
        let step = (elapsed.as_millis() / LOADING_MESSAGE_INTERVAL.as_millis()) as usize;
        self.loading_messages
            .get(step % self.loading_messages.len())
            .map(String::as_str)
    }

    pub fn validation_message(&self, error: &ValidationError) -> &str {
        match error {
            ValidationError::MissingRequiredFields(_) => &self.form_error,
            ValidationError::BudgetTooLow { .. } => &self.form_budget_error_min,
        }
    }

    pub fn login_message(&self, error: &LoginError) -> &str {
        match error {
            LoginError::MissingFields => &self.login_error_all_fields,
            LoginError::InvalidEmail => &self.login_error_invalid_email,
        }
    }
}

/// Replace `{key}` placeholders
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

/// Per-language catalogs with English fallback
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<Language, Translations>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let mut tables = HashMap::new();
        tables.insert(Language::En, Translations::english());
        Self { tables }
    }

    /// Parse `{"hi": {...}, "ta": {...}}`; missing keys fall back to English
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let parsed: HashMap<Language, Translations> = serde_json::from_str(json)
            .map_err(|e| PlannerError::Localization(format!("invalid catalog: {}", e)))?;

        let mut catalog = Self::builtin();
        catalog.tables.extend(parsed);
        Ok(catalog)
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, language: Language) -> &Translations {
        self.tables
            .get(&language)
            .or_else(|| self.tables.get(&Language::En))
            .unwrap_or(&*ENGLISH)
    }

    pub fn has(&self, language: Language) -> bool {
        self.tables.contains_key(&language)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

lazy_static::lazy_static! {
    static ref ENGLISH: Translations = Translations::english();
}
