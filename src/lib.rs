//! Itinerary Planner
//!
//! Turns a traveller's preferences into a day-by-day trip plan for an Indian
//! destination:
//! - Validates raw form input into typed preferences
//! - Builds a structured-output request for a generative model
//! - Parses the model's JSON into a typed plan
//! - Drives the plan through a small state machine (loading, booking, reset)
//! - Encodes plans into shareable links and restores them without a model call
//!
//! UNIFIED LOOP:
//! VALIDATE → BUILD REQUEST → FETCH → RESOLVE → (SHARE | BOOK | RESET)

pub mod api;
pub mod auth;
pub mod booking;
pub mod config;
pub mod error;
pub mod gemini;
pub mod i18n;
pub mod models;
pub mod provider;
pub mod request;
pub mod session;
pub mod share;
pub mod state;
pub mod validation;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use provider::{GeminiProvider, ItineraryProvider, MockProvider};
pub use session::PlanSession;
pub use state::{Outcome, PlanController, PlanEvent, PlanState};
pub use validation::{PreferenceValidator, RawTripInput};
