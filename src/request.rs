//! Provider-agnostic itinerary request
//!
//! Turns validated preferences into the instruction prompt plus the
//! structured-output schema the provider must follow. No network access.

use crate::models::TripPreferences;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const RESPONSE_MIME_TYPE: &str = "application/json";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Fully specified generation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderRequest {
    pub prompt: String,
    pub response_schema: Value,
    pub response_mime_type: String,
    pub temperature: f32,
}

/// Build the request for one generation
pub fn build(preferences: &TripPreferences) -> ProviderRequest {
    ProviderRequest {
        prompt: build_prompt(preferences),
        response_schema: itinerary_schema(),
        response_mime_type: RESPONSE_MIME_TYPE.to_string(),
        temperature: DEFAULT_TEMPERATURE,
    }
}

fn build_prompt(preferences: &TripPreferences) -> String {
    let language = preferences.language.display_name();
    let interests = preferences.interests.join(", ");
    let duration = preferences.duration;
    let budget = format_budget(preferences.budget);

    format!(
        r#"You are an expert travel agent specializing in personalized itineraries for destinations in India. A user wants to plan a trip. Generate a detailed, end-to-end itinerary based on the following criteria:

- Destination: {destination}, India
- Trip Duration: {duration} days
- Total Budget for Activities: Approximately ₹{budget} INR
- Primary Interests: {interests}
- Language for Response: {language}

Rules:
1. The entire response, including all text, titles, and descriptions, MUST be in {language}.
2. The itinerary must cover all {duration} days, numbered from 1.
3. `totalEstimatedCost` is the sum of the daily activity costs ONLY and should be close to ₹{budget} INR. It MUST NOT include accommodation.
4. Mix famous landmarks and hidden gems that match these interests: {interests}.
5. Every day needs at least 3 distinct activities with suggested times, locations, and whether prior booking is needed.
6. Give realistic costs in INR for each activity and a total for each day.
7. Recommend 2-3 specific, budget-appropriate hotels or guesthouses in `accommodation`, each with a short description.
8. Give one concise recommendation for local transport in `transportation`.
9. Mention local transport and meal spots or dishes inside activity descriptions where it helps.
10. Keep each day geographically sensible.

Respond ONLY with a JSON object that conforms to the provided schema. No introductory text, closing remarks, or anything outside the JSON object."#,
        destination = preferences.destination,
        duration = duration,
        budget = budget,
        interests = interests,
        language = language,
    )
}

fn format_budget(budget: f64) -> String {
    if budget.fract() == 0.0 {
        format!("{:.0}", budget)
    } else {
        format!("{:.2}", budget)
    }
}

/// Structured-output schema for `ItineraryPlan`.
///
/// Must stay in lockstep with the serde definition in `models`.
pub fn itinerary_schema() -> Value {
    let activity = json!({
        "type": "OBJECT",
        "properties": {
            "time": {
                "type": "STRING",
                "description": "Suggested time for the activity, e.g. '9:00 AM' or 'Afternoon'."
            },
            "description": {
                "type": "STRING",
                "description": "What the activity is, where it happens and what to expect."
            },
            "estimatedCost": {
                "type": "NUMBER",
                "description": "Estimated cost of this activity in INR. 0 for free activities."
            },
            "bookingNeeded": {
                "type": "BOOLEAN",
                "description": "Whether prior booking is recommended."
            }
        },
        "required": ["time", "description", "estimatedCost", "bookingNeeded"]
    });

    let day = json!({
        "type": "OBJECT",
        "properties": {
            "day": {
                "type": "INTEGER",
                "description": "Day number, starting from 1."
            },
            "title": {
                "type": "STRING",
                "description": "Short theme for the day."
            },
            "activities": {
                "type": "ARRAY",
                "description": "Activities for the day in chronological order.",
                "items": activity
            },
            "dailyCost": {
                "type": "NUMBER",
                "description": "Total activity cost for the day in INR."
            }
        },
        "required": ["day", "title", "activities", "dailyCost"]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "tripTitle": {
                "type": "STRING",
                "description": "A catchy title for the trip, e.g. 'Spiritual Sojourn in Varanasi'."
            },
            "totalEstimatedCost": {
                "type": "NUMBER",
                "description": "Total activity cost for the whole trip in INR, excluding accommodation."
            },
            "accommodation": {
                "type": "ARRAY",
                "description": "2-3 hotels or guesthouses suited to the budget.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Name of the hotel." },
                        "description": { "type": "STRING", "description": "Why it is a good fit." },
                        "estimatedCostPerNight": { "type": "NUMBER", "description": "Cost per night in INR." }
                    },
                    "required": ["name", "description", "estimatedCostPerNight"]
                }
            },
            "transportation": {
                "type": "OBJECT",
                "description": "Local transportation advice.",
                "properties": {
                    "recommendation": {
                        "type": "STRING",
                        "description": "Best way to get around the destination."
                    }
                },
                "required": ["recommendation"]
            },
            "dailyPlans": {
                "type": "ARRAY",
                "description": "One entry per day of the trip.",
                "items": day
            }
        },
        "required": ["tripTitle", "totalEstimatedCost", "accommodation", "transportation", "dailyPlans"]
    })
}
