//! Core data models for the itinerary planner

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Ta,
    Te,
    Ml,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Hi,
        Language::Ta,
        Language::Te,
        Language::Ml,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Ta => "ta",
            Language::Te => "te",
            Language::Ml => "ml",
        }
    }

    /// English name of the language, used inside provider prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
            Language::Ta => "Tamil",
            Language::Te => "Telugu",
            Language::Ml => "Malayalam",
        }
    }

    /// Name of the language written in its own script, for language pickers
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "हिन्दी",
            Language::Ta => "தமிழ்",
            Language::Te => "తెలుగు",
            Language::Ml => "മലയാളം",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .iter()
            .copied()
            .find(|lang| lang.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported language code: {}", s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Idle,
    Booked,
    Failed,
}

//
// ================= Session =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub email: String,
}

/// Per-session values threaded into the components that need them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionContext {
    pub user: Option<User>,
    pub language: Language,
}

impl SessionContext {
    pub fn new(user: Option<User>, language: Language) -> Self {
        Self { user, language }
    }
}

//
// ================= Preferences =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripPreferences {
    pub destination: String,
    pub duration: u32,
    pub budget: f64,
    pub interests: Vec<String>,
    pub language: Language,
}

//
// ================= Itinerary =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Free-form label such as "9:00 AM" or "Afternoon"
    pub time: String,
    pub description: String,
    pub estimated_cost: f64,
    pub booking_needed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryDay {
    pub day: u32,
    pub title: String,
    pub activities: Vec<Activity>,
    pub daily_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationSuggestion {
    pub name: String,
    pub description: String,
    pub estimated_cost_per_night: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportationSuggestion {
    pub recommendation: String,
}

/// AI-generated trip plan. Never mutated once received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPlan {
    pub trip_title: String,
    /// Activity costs only. Provider-reported; not recomputed here.
    pub total_estimated_cost: f64,
    pub accommodation: Vec<AccommodationSuggestion>,
    pub transportation: TransportationSuggestion,
    pub daily_plans: Vec<ItineraryDay>,
}

impl ItineraryPlan {
    pub fn day_count(&self) -> usize {
        self.daily_plans.len()
    }

    /// Sum of the per-day activity costs
    pub fn activities_cost(&self) -> f64 {
        self.daily_plans.iter().map(|d| d.daily_cost).sum()
    }

    /// Reported total minus the sum of daily costs. Zero when consistent.
    pub fn cost_discrepancy(&self) -> f64 {
        self.total_estimated_cost - self.activities_cost()
    }

    pub fn booking_required_activities(&self) -> impl Iterator<Item = (u32, &Activity)> {
        self.daily_plans.iter().flat_map(|day| {
            day.activities
                .iter()
                .filter(|a| a.booking_needed)
                .map(move |a| (day.day, a))
        })
    }

    /// Place name taken from a title like "Royal Heritage in Jaipur"
    pub fn destination_hint(&self) -> &str {
        self.trip_title
            .rsplit(" in ")
            .next()
            .unwrap_or(&self.trip_title)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn activity(time: &str, description: &str, cost: f64, booking: bool) -> Activity {
        Activity {
            time: time.to_string(),
            description: description.to_string(),
            estimated_cost: cost,
            booking_needed: booking,
        }
    }

    /// Three-day Jaipur plan whose daily costs add up to 5400
    pub fn jaipur_plan() -> ItineraryPlan {
        ItineraryPlan {
            trip_title: "Royal Heritage & Flavours in Jaipur".to_string(),
            total_estimated_cost: 5400.0,
            accommodation: vec![
                AccommodationSuggestion {
                    name: "Hotel Pearl Palace".to_string(),
                    description: "Friendly heritage-style guesthouse near Hathroi Fort.".to_string(),
                    estimated_cost_per_night: 2200.0,
                },
                AccommodationSuggestion {
                    name: "Zostel Jaipur".to_string(),
                    description: "Lively backpacker hostel in the old city.".to_string(),
                    estimated_cost_per_night: 850.0,
                },
            ],
            transportation: TransportationSuggestion {
                recommendation: "Use auto-rickshaws and app cabs between forts.".to_string(),
            },
            daily_plans: vec![
                ItineraryDay {
                    day: 1,
                    title: "Forts of the Aravallis".to_string(),
                    activities: vec![
                        activity("8:00 AM", "Amber Fort and the Sheesh Mahal", 500.0, true),
                        activity("1:00 PM", "Dal baati churma at a local dhaba", 300.0, false),
                        activity("4:00 PM", "Jaigarh Fort and the Jaivana cannon", 400.0, false),
                    ],
                    daily_cost: 1200.0,
                },
                ItineraryDay {
                    day: 2,
                    title: "Pink City Walk".to_string(),
                    activities: vec![
                        activity("9:00 AM", "City Palace museum", 700.0, true),
                        activity("11:30 AM", "Jantar Mantar observatory", 200.0, false),
                        activity("Evening", "Johari Bazaar street food crawl", 900.0, false),
                    ],
                    daily_cost: 1800.0,
                },
                ItineraryDay {
                    day: 3,
                    title: "Crafts & Sunset".to_string(),
                    activities: vec![
                        activity("10:00 AM", "Block-printing workshop in Sanganer", 1200.0, true),
                        activity("2:00 PM", "Thali lunch at LMB", 600.0, false),
                        activity("6:00 PM", "Sunset at Nahargarh Fort", 600.0, false),
                    ],
                    daily_cost: 2400.0,
                },
            ],
        }
    }

    pub fn jaipur_preferences() -> TripPreferences {
        TripPreferences {
            destination: "Jaipur".to_string(),
            duration: 3,
            budget: 6000.0,
            interests: vec!["heritage".to_string(), "food".to_string()],
            language: Language::En,
        }
    }
}
