//! Simulated booking and payment
//!
//! No money moves. Confirming always succeeds and the booking reference is a
//! digest of the plan and the traveller's email, so the same booking always
//! gets the same reference.

use crate::i18n::{render, Translations};
use crate::models::{ItineraryPlan, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingReceipt {
    pub reference: String,
    pub trip_title: String,
    pub amount: f64,
    pub email: Option<String>,
    pub confirmed_at: DateTime<Utc>,
}

/// Confirm the simulated payment for a plan
pub fn confirm(plan: &ItineraryPlan, user: Option<&User>) -> BookingReceipt {
    BookingReceipt {
        reference: booking_reference(plan, user),
        trip_title: plan.trip_title.clone(),
        amount: plan.total_estimated_cost,
        email: user.map(|u| u.email.clone()),
        confirmed_at: Utc::now(),
    }
}

/// `TRIP-` followed by the first 10 hex digits of SHA-256(plan JSON, email)
pub fn booking_reference(plan: &ItineraryPlan, user: Option<&User>) -> String {
    let mut hasher = Sha256::new();

    // Stream JSON directly into hasher (no intermediate String)
    if serde_json::to_writer(HashWriter(&mut hasher), plan).is_err() {
        hasher.update(plan.trip_title.as_bytes());
    }
    if let Some(user) = user {
        hasher.update(user.email.trim().to_lowercase().as_bytes());
    }

    let digest = hex::encode(hasher.finalize());
    format!("TRIP-{}", digest[..10].to_uppercase())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Texts for the booking confirmation screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationText {
    pub title: String,
    pub subtitle: String,
    pub message: String,
}

pub fn confirmation_text(
    translations: &Translations,
    plan: &ItineraryPlan,
    user: Option<&User>,
) -> ConfirmationText {
    let message = match user {
        Some(user) => render(
            &translations.booking_confirmed_message,
            &[("email", user.email.as_str())],
        ),
        None => translations.booking_confirmed_generic.clone(),
    };

    ConfirmationText {
        title: translations.booking_confirmed_title.clone(),
        subtitle: render(
            &translations.booking_confirmed_subtitle,
            &[("destination", plan.destination_hint())],
        ),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::jaipur_plan;

    fn asha() -> User {
        User {
            name: "Asha".to_string(),
            email: "asha@example.in".to_string(),
        }
    }

    #[test]
    fn test_reference_is_deterministic() {
        let plan = jaipur_plan();
        let a = booking_reference(&plan, Some(&asha()));
        let b = booking_reference(&plan, Some(&asha()));
        assert_eq!(a, b);
        assert!(a.starts_with("TRIP-"));
        assert_eq!(a.len(), 15);

        assert_ne!(a, booking_reference(&plan, None));
    }

    #[test]
    fn test_receipt_amount_is_plan_total() {
        let receipt = confirm(&jaipur_plan(), Some(&asha()));
        assert_eq!(receipt.amount, 5400.0);
        assert_eq!(receipt.email.as_deref(), Some("asha@example.in"));
        assert_eq!(receipt.trip_title, "Royal Heritage & Flavours in Jaipur");
    }

    #[test]
    fn test_confirmation_text() {
        let t = Translations::english();
        let plan = jaipur_plan();

        let with_user = confirmation_text(&t, &plan, Some(&asha()));
        assert!(with_user.message.contains("asha@example.in"));
        assert_eq!(with_user.subtitle, "Get ready for your trip to Jaipur.");

        let anonymous = confirmation_text(&t, &plan, None);
        assert_eq!(anonymous.message, t.booking_confirmed_generic);
    }
}
