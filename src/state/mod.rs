//! Plan state controller
//!
//! Reducer over UI events, independent of any rendering layer:
//!
//! IDLE → LOADING → (READY | ERROR) → BOOKING_OPEN → BOOKED
//!
//! Every submission gets a fresh generation id. A provider result carrying
//! any other id is dropped, which is how a reset during loading suppresses
//! the late response.

use crate::booking::{self, BookingReceipt};
use crate::error::ProviderError;
use crate::i18n::Translations;
use crate::models::{BookingStatus, ItineraryPlan, Language, SessionContext, TripPreferences};
use crate::request::{self, ProviderRequest};
use crate::share;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type GenerationId = u64;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum PlanState {
    Idle,
    Loading,
    Ready(Arc<ItineraryPlan>),
    Error(String),
    BookingOpen(Arc<ItineraryPlan>),
    Booked(Arc<ItineraryPlan>),
}

impl PlanState {
    pub fn name(&self) -> &'static str {
        match self {
            PlanState::Idle => "idle",
            PlanState::Loading => "loading",
            PlanState::Ready(_) => "ready",
            PlanState::Error(_) => "error",
            PlanState::BookingOpen(_) => "booking_open",
            PlanState::Booked(_) => "booked",
        }
    }

    pub fn plan(&self) -> Option<&Arc<ItineraryPlan>> {
        match self {
            PlanState::Ready(plan) | PlanState::BookingOpen(plan) | PlanState::Booked(plan) => {
                Some(plan)
            }
            PlanState::Idle | PlanState::Loading | PlanState::Error(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PlanEvent {
    Submit(TripPreferences),
    Resolved {
        generation: GenerationId,
        result: Result<ItineraryPlan, ProviderError>,
    },
    StartBooking,
    ConfirmBooking,
    CancelBooking,
    Reset,
}

impl PlanEvent {
    fn name(&self) -> &'static str {
        match self {
            PlanEvent::Submit(_) => "submit",
            PlanEvent::Resolved { .. } => "resolved",
            PlanEvent::StartBooking => "start_booking",
            PlanEvent::ConfirmBooking => "confirm_booking",
            PlanEvent::CancelBooking => "cancel_booking",
            PlanEvent::Reset => "reset",
        }
    }
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    /// State is now Loading; the driver must run this request
    Fetch {
        generation: GenerationId,
        request: ProviderRequest,
    },
    /// Event not valid in the current state; nothing changed
    Rejected { event: &'static str, state: &'static str },
    /// Provider result for a generation that is no longer active
    Discarded { generation: GenerationId },
}

/// Read-only view of the controller for presentation layers
#[derive(Debug, Clone, Serialize)]
pub struct PlanSnapshot {
    #[serde(flatten)]
    pub state: PlanState,
    pub booking_status: BookingStatus,
    pub receipt: Option<BookingReceipt>,
    pub address: String,
    pub language: Language,
}

pub struct PlanController {
    state: PlanState,
    booking_status: BookingStatus,
    receipt: Option<BookingReceipt>,
    next_generation: GenerationId,
    active_generation: Option<GenerationId>,
    address: String,
    context: SessionContext,
    translations: Translations,
}

impl PlanController {
    pub fn new(
        context: SessionContext,
        translations: Translations,
        address: impl Into<String>,
    ) -> Self {
        Self {
            state: PlanState::Idle,
            booking_status: BookingStatus::Idle,
            receipt: None,
            next_generation: 1,
            active_generation: None,
            address: address.into(),
            context,
            translations,
        }
    }

    pub fn state(&self) -> &PlanState {
        &self.state
    }

    pub fn plan(&self) -> Option<&ItineraryPlan> {
        self.state.plan().map(|p| p.as_ref())
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PlanState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn booking_status(&self) -> BookingStatus {
        self.booking_status
    }

    pub fn receipt(&self) -> Option<&BookingReceipt> {
        self.receipt.as_ref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.context
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Switch UI language; applies to messages produced from now on
    pub fn set_language(&mut self, language: Language, translations: Translations) {
        self.context.language = language;
        self.translations = translations;
    }

    pub fn active_generation(&self) -> Option<GenerationId> {
        self.active_generation
    }

    pub fn snapshot(&self) -> PlanSnapshot {
        PlanSnapshot {
            state: self.state.clone(),
            booking_status: self.booking_status,
            receipt: self.receipt.clone(),
            address: self.address.clone(),
            language: self.context.language,
        }
    }

    /// Initial load: a share token in the address goes straight to Ready
    pub fn rehydrate(&mut self) -> Outcome {
        if self.state != PlanState::Idle {
            return self.reject("rehydrate");
        }

        let Some(token) = share::token_from_address(&self.address) else {
            return Outcome::Applied;
        };

        match share::decode(&token) {
            Ok(plan) => {
                info!(title = %plan.trip_title, "Rehydrated shared itinerary");
                self.state = PlanState::Ready(Arc::new(plan));
            }
            Err(e) => {
                warn!("Failed to decode shared itinerary: {}", e);
                self.state = PlanState::Error(self.translations.error_shared_itinerary.clone());
            }
        }
        Outcome::Applied
    }

    pub fn handle(&mut self, event: PlanEvent) -> Outcome {
        let event_name = event.name();
        let from = self.state.name();

        let outcome = match event {
            PlanEvent::Submit(preferences) => self.submit(preferences),
            PlanEvent::Resolved { generation, result } => self.resolve(generation, result),
            PlanEvent::StartBooking => match &self.state {
                PlanState::Ready(plan) => {
                    self.state = PlanState::BookingOpen(plan.clone());
                    Outcome::Applied
                }
                _ => self.reject(event_name),
            },
            PlanEvent::ConfirmBooking => match &self.state {
                PlanState::BookingOpen(plan) => {
                    let plan = plan.clone();
                    let receipt = booking::confirm(&plan, self.context.user.as_ref());
                    info!(reference = %receipt.reference, "Booking confirmed");
                    self.receipt = Some(receipt);
                    self.booking_status = BookingStatus::Booked;
                    self.state = PlanState::Booked(plan);
                    Outcome::Applied
                }
                _ => self.reject(event_name),
            },
            PlanEvent::CancelBooking => match &self.state {
                PlanState::BookingOpen(plan) => {
                    self.state = PlanState::Ready(plan.clone());
                    Outcome::Applied
                }
                _ => self.reject(event_name),
            },
            PlanEvent::Reset => {
                self.clear();
                self.state = PlanState::Idle;
                Outcome::Applied
            }
        };

        debug!(
            event = event_name,
            from,
            to = self.state.name(),
            outcome = outcome_label(&outcome),
            "Plan event handled"
        );

        outcome
    }

    fn submit(&mut self, preferences: TripPreferences) -> Outcome {
        match self.state {
            PlanState::Idle | PlanState::Error(_) | PlanState::Ready(_) => {}
            // Loading refuses concurrent submissions
            _ => return self.reject("submit"),
        }

        self.clear();

        let generation = self.next_generation;
        self.next_generation += 1;
        self.active_generation = Some(generation);
        self.state = PlanState::Loading;

        info!(
            generation,
            destination = %preferences.destination,
            days = preferences.duration,
            language = preferences.language.code(),
            "Generating itinerary"
        );

        Outcome::Fetch {
            generation,
            request: request::build(&preferences),
        }
    }

    fn resolve(
        &mut self,
        generation: GenerationId,
        result: Result<ItineraryPlan, ProviderError>,
    ) -> Outcome {
        if self.active_generation != Some(generation) || self.state != PlanState::Loading {
            debug!(
                generation,
                active = ?self.active_generation,
                "Discarding stale provider result"
            );
            return Outcome::Discarded { generation };
        }

        self.active_generation = None;
        self.state = match result {
            Ok(plan) => PlanState::Ready(Arc::new(plan)),
            Err(e) => {
                warn!(generation, kind = ?e.kind, "Itinerary generation failed: {}", e.message);
                PlanState::Error(self.translations.error_generate_itinerary.clone())
            }
        };
        Outcome::Applied
    }

    /// Drop plan, error, booking status, overlay and share parameter
    fn clear(&mut self) {
        self.active_generation = None;
        self.booking_status = BookingStatus::Idle;
        self.receipt = None;
        self.address = share::strip_share_param(&self.address);
    }

    fn reject(&self, event: &'static str) -> Outcome {
        debug!(event, state = self.state.name(), "Event rejected");
        Outcome::Rejected {
            event,
            state: self.state.name(),
        }
    }
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Applied => "applied",
        Outcome::Fetch { .. } => "fetch",
        Outcome::Rejected { .. } => "rejected",
        Outcome::Discarded { .. } => "discarded",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;
    use crate::models::fixtures::{jaipur_plan, jaipur_preferences};
    use crate::models::User;

    fn controller(address: &str) -> PlanController {
        let user = User {
            name: "Asha".to_string(),
            email: "asha@example.in".to_string(),
        };
        PlanController::new(
            SessionContext::new(Some(user), Language::En),
            Translations::english(),
            address,
        )
    }

    fn submit(c: &mut PlanController) -> GenerationId {
        match c.handle(PlanEvent::Submit(jaipur_preferences())) {
            Outcome::Fetch { generation, .. } => generation,
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    fn all_states() -> Vec<PlanController> {
        let idle = controller("/");

        let mut loading = controller("/");
        submit(&mut loading);

        let mut ready = controller("/");
        let g = submit(&mut ready);
        ready.handle(PlanEvent::Resolved {
            generation: g,
            result: Ok(jaipur_plan()),
        });

        let mut error = controller("/");
        let g = submit(&mut error);
        error.handle(PlanEvent::Resolved {
            generation: g,
            result: Err(ProviderError::transport("down")),
        });

        let mut open = controller("/");
        let g = submit(&mut open);
        open.handle(PlanEvent::Resolved {
            generation: g,
            result: Ok(jaipur_plan()),
        });
        open.handle(PlanEvent::StartBooking);

        let mut booked = controller("/");
        let g = submit(&mut booked);
        booked.handle(PlanEvent::Resolved {
            generation: g,
            result: Ok(jaipur_plan()),
        });
        booked.handle(PlanEvent::StartBooking);
        booked.handle(PlanEvent::ConfirmBooking);

        vec![idle, loading, ready, error, open, booked]
    }

    #[test]
    fn test_jaipur_flow_to_booked() {
        let mut c = controller("/");
        let generation = submit(&mut c);
        assert_eq!(c.state(), &PlanState::Loading);

        c.handle(PlanEvent::Resolved { generation, result: Ok(jaipur_plan()) });
        assert_eq!(c.plan(), Some(&jaipur_plan()));
        assert_eq!(c.plan().unwrap().total_estimated_cost, 5400.0);
        assert_eq!(c.state().name(), "ready");

        assert_eq!(c.handle(PlanEvent::StartBooking), Outcome::Applied);
        assert_eq!(c.state().name(), "booking_open");
        assert_eq!(c.plan(), Some(&jaipur_plan()));

        assert_eq!(c.handle(PlanEvent::ConfirmBooking), Outcome::Applied);
        assert_eq!(c.state().name(), "booked");
        assert_eq!(c.booking_status(), BookingStatus::Booked);
        assert_eq!(c.receipt().unwrap().amount, 5400.0);
    }

    #[test]
    fn test_submit_builds_request_for_preferences() {
        let mut c = controller("/");
        match c.handle(PlanEvent::Submit(jaipur_preferences())) {
            Outcome::Fetch { request, .. } => {
                assert!(request.prompt.contains("Jaipur"));
            }
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_sets_localized_message() {
        let mut c = controller("/");
        let generation = submit(&mut c);
        c.handle(PlanEvent::Resolved {
            generation,
            result: Err(ProviderError::new(
                ProviderErrorKind::SchemaMismatch,
                "missing dailyPlans",
            )),
        });

        assert_eq!(c.error(), Some(Translations::english().error_generate_itinerary.as_str()));
        assert!(c.plan().is_none());

        // the form is back: retry is allowed
        assert!(matches!(
            c.handle(PlanEvent::Submit(jaipur_preferences())),
            Outcome::Fetch { .. }
        ));
    }

    #[test]
    fn test_cancel_booking_keeps_plan() {
        let mut c = controller("/");
        let g = submit(&mut c);
        c.handle(PlanEvent::Resolved {
            generation: g,
            result: Ok(jaipur_plan()),
        });
        c.handle(PlanEvent::StartBooking);

        assert_eq!(c.handle(PlanEvent::CancelBooking), Outcome::Applied);
        assert_eq!(c.state(), &PlanState::Ready(Arc::new(jaipur_plan())));
        assert_eq!(c.booking_status(), BookingStatus::Idle);
    }

    #[test]
    fn test_loading_refuses_second_submit() {
        let mut c = controller("/");
        let first = submit(&mut c);

        assert_eq!(
            c.handle(PlanEvent::Submit(jaipur_preferences())),
            Outcome::Rejected { event: "submit", state: "loading" }
        );
        assert_eq!(c.active_generation(), Some(first));
    }

    #[test]
    fn test_reset_from_any_state_clears_everything() {
        for mut c in all_states() {
            let from = c.state().name();
            assert_eq!(c.handle(PlanEvent::Reset), Outcome::Applied, "from {}", from);
            assert_eq!(c.state(), &PlanState::Idle, "from {}", from);
            assert!(c.plan().is_none());
            assert!(c.error().is_none());
            assert!(c.receipt().is_none());
            assert_eq!(c.booking_status(), BookingStatus::Idle);
            assert_eq!(c.active_generation(), None);
        }
    }

    #[test]
    fn test_stale_response_after_reset_is_discarded() {
        let mut c = controller("/");
        let generation = submit(&mut c);
        c.handle(PlanEvent::Reset);

        let outcome = c.handle(PlanEvent::Resolved { generation, result: Ok(jaipur_plan()) });
        assert_eq!(outcome, Outcome::Discarded { generation });
        assert_eq!(c.state(), &PlanState::Idle);
    }

    #[test]
    fn test_response_from_older_generation_is_discarded() {
        let mut c = controller("/");
        let old = submit(&mut c);
        c.handle(PlanEvent::Reset);
        let current = submit(&mut c);
        assert_ne!(old, current);

        let outcome = c.handle(PlanEvent::Resolved {
            generation: old,
            result: Err(ProviderError::transport("late")),
        });
        assert_eq!(outcome, Outcome::Discarded { generation: old });
        assert_eq!(c.state(), &PlanState::Loading);

        c.handle(PlanEvent::Resolved {
            generation: current,
            result: Ok(jaipur_plan()),
        });
        assert_eq!(c.state().name(), "ready");
    }

    #[test]
    fn test_booking_events_rejected_outside_their_states() {
        let mut c = controller("/");
        assert!(matches!(c.handle(PlanEvent::StartBooking), Outcome::Rejected { .. }));
        assert!(matches!(c.handle(PlanEvent::ConfirmBooking), Outcome::Rejected { .. }));
        assert!(matches!(c.handle(PlanEvent::CancelBooking), Outcome::Rejected { .. }));
        assert_eq!(c.state(), &PlanState::Idle);
    }

    #[test]
    fn test_rehydrate_from_share_link() {
        let url = share::share_url("https://trips.example/", &jaipur_plan()).unwrap();
        let mut c = controller(&url);

        assert_eq!(c.rehydrate(), Outcome::Applied);
        assert_eq!(c.plan(), Some(&jaipur_plan()));
        assert_eq!(c.active_generation(), None);
    }

    #[test]
    fn test_rehydrate_bad_link_uses_link_message() {
        let mut c = controller("https://trips.example/?itinerary=not-a-plan");
        c.rehydrate();

        let t = Translations::english();
        assert_eq!(c.error(), Some(t.error_shared_itinerary.as_str()));
        assert_ne!(t.error_shared_itinerary, t.error_generate_itinerary);
    }

    #[test]
    fn test_rehydrate_without_token_stays_idle() {
        let mut c = controller("https://trips.example/?lang=ta");
        assert_eq!(c.rehydrate(), Outcome::Applied);
        assert_eq!(c.state(), &PlanState::Idle);
    }

    #[test]
    fn test_submit_and_reset_strip_share_param() {
        let url = share::share_url("https://trips.example/?lang=ta", &jaipur_plan()).unwrap();

        let mut c = controller(&url);
        c.rehydrate();
        submit(&mut c);
        assert_eq!(c.address(), "https://trips.example/?lang=ta");

        let mut c = controller(&url);
        c.rehydrate();
        c.handle(PlanEvent::Reset);
        assert_eq!(c.address(), "https://trips.example/?lang=ta");
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut c = controller("/");
        let g = submit(&mut c);
        c.handle(PlanEvent::Resolved {
            generation: g,
            result: Ok(jaipur_plan()),
        });

        let json = serde_json::to_value(c.snapshot()).unwrap();
        assert_eq!(json["state"], "ready");
        assert_eq!(json["data"]["tripTitle"], "Royal Heritage & Flavours in Jaipur");
        assert_eq!(json["booking_status"], "idle");
        assert_eq!(json["language"], "en");
    }
}
