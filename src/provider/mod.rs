//! Itinerary provider trait and implementations
//!
//! A provider turns a fully built request into a canonical plan.
//! Every failure collapses into a single `ProviderError`.

use crate::error::ProviderError;
use crate::models::ItineraryPlan;
use crate::request::ProviderRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod gemini;
pub use gemini::{parse_plan_response, GeminiProvider};

/// Trait for itinerary generation (LLM backed)
#[async_trait]
pub trait ItineraryProvider: Send + Sync {
    /// Single attempt; no retries
    async fn fetch_plan(&self, request: &ProviderRequest) -> Result<ItineraryPlan, ProviderError>;
}

/// Mock provider for development & testing
/// Keeps the system functional without LLM dependency
pub struct MockProvider {
    response: Result<ItineraryPlan, ProviderError>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn succeeding(plan: ItineraryPlan) -> Self {
        Self {
            response: Ok(plan),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItineraryProvider for MockProvider {
    async fn fetch_plan(&self, _request: &ProviderRequest) -> Result<ItineraryPlan, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}
