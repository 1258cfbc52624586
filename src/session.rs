//! Planning session driver
//!
//! Owns one controller and runs its provider fetches:
//! VALIDATE → SUBMIT → FETCH (lock released) → RESOLVE
//!
//! The controller lock is never held across the provider call, so reset and
//! booking events keep flowing while a generation is in flight.

use crate::auth;
use crate::error::PlannerError;
use crate::i18n::Translations;
use crate::models::{Language, SessionContext};
use crate::provider::ItineraryProvider;
use crate::request::ProviderRequest;
use crate::state::{GenerationId, Outcome, PlanController, PlanEvent, PlanSnapshot};
use crate::validation::{PreferenceValidator, RawTripInput};
use crate::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// A generation accepted by the controller but not yet fetched
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub generation: GenerationId,
    pub request: ProviderRequest,
}

pub struct PlanSession {
    controller: RwLock<PlanController>,
    provider: Arc<dyn ItineraryProvider>,
    validator: Arc<PreferenceValidator>,
}

impl PlanSession {
    pub fn new(
        controller: PlanController,
        provider: Arc<dyn ItineraryProvider>,
        validator: Arc<PreferenceValidator>,
    ) -> Self {
        Self {
            controller: RwLock::new(controller),
            provider,
            validator,
        }
    }

    /// Open a session at `address`, rehydrating a shared plan if present
    pub fn open(
        context: SessionContext,
        translations: Translations,
        address: &str,
        provider: Arc<dyn ItineraryProvider>,
        validator: Arc<PreferenceValidator>,
    ) -> Self {
        let mut controller = PlanController::new(context, translations, address);
        controller.rehydrate();
        Self::new(controller, provider, validator)
    }

    /// Validate the form and move to Loading.
    ///
    /// Validation errors leave the state untouched. Returns `None` when the
    /// controller refuses the submission (a generation is already running).
    pub async fn start(&self, input: &RawTripInput) -> Result<Option<PendingFetch>> {
        let preferences = self.validator.validate(input)?;

        let mut controller = self.controller.write().await;
        match controller.handle(PlanEvent::Submit(preferences)) {
            Outcome::Fetch {
                generation,
                request,
            } => Ok(Some(PendingFetch {
                generation,
                request,
            })),
            _ => Ok(None),
        }
    }

    /// Run the provider call for a pending generation and apply its result
    pub async fn complete(&self, pending: PendingFetch) -> Outcome {
        let result = self.provider.fetch_plan(&pending.request).await;

        let mut controller = self.controller.write().await;
        let outcome = controller.handle(PlanEvent::Resolved {
            generation: pending.generation,
            result,
        });

        if let Outcome::Discarded { generation } = outcome {
            info!(generation, "Provider result arrived after reset; ignored");
        }
        outcome
    }

    /// `start` followed by `complete`
    pub async fn submit(&self, input: &RawTripInput) -> Result<Outcome> {
        match self.start(input).await? {
            Some(pending) => Ok(self.complete(pending).await),
            None => {
                let state = self.controller.read().await.state().name();
                Err(PlannerError::InvalidTransition(format!(
                    "submit refused while {}",
                    state
                )))
            }
        }
    }

    pub async fn dispatch(&self, event: PlanEvent) -> Outcome {
        self.controller.write().await.handle(event)
    }

    pub async fn start_booking(&self) -> Outcome {
        self.dispatch(PlanEvent::StartBooking).await
    }

    pub async fn confirm_booking(&self) -> Outcome {
        self.dispatch(PlanEvent::ConfirmBooking).await
    }

    pub async fn cancel_booking(&self) -> Outcome {
        self.dispatch(PlanEvent::CancelBooking).await
    }

    pub async fn reset(&self) -> Outcome {
        self.dispatch(PlanEvent::Reset).await
    }

    /// Sign the user out and drop any plan or in-flight generation
    pub async fn logout(&self) -> Outcome {
        let mut controller = self.controller.write().await;
        auth::logout(controller.context_mut());
        controller.handle(PlanEvent::Reset)
    }

    pub async fn set_language(&self, language: Language, translations: Translations) {
        self.controller
            .write()
            .await
            .set_language(language, translations);
    }

    pub async fn snapshot(&self) -> PlanSnapshot {
        self.controller.read().await.snapshot()
    }

    pub async fn context(&self) -> SessionContext {
        self.controller.read().await.context().clone()
    }
}
