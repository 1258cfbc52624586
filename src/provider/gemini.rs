//! Gemini-powered itinerary provider

use crate::error::ProviderError;
use crate::gemini::{GeminiClient, GeminiSettings};
use crate::models::ItineraryPlan;
use crate::request::ProviderRequest;
use async_trait::async_trait;
use tracing::{info, warn};

pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    pub fn new(settings: GeminiSettings) -> crate::Result<Self> {
        Ok(Self {
            client: GeminiClient::new(settings)?,
        })
    }
}

#[async_trait]
impl super::ItineraryProvider for GeminiProvider {
    async fn fetch_plan(&self, request: &ProviderRequest) -> Result<ItineraryPlan, ProviderError> {
        let response = self.client.generate_structured(request).await?;
        let plan = parse_plan_response(&response)?;

        info!(
            model = self.client.model(),
            title = %plan.trip_title,
            days = plan.day_count(),
            "Itinerary generated"
        );

        Ok(plan)
    }
}

/// Parse plan response text.
///
/// Extra fields are ignored; missing or mistyped required fields are a
/// schema mismatch; non-JSON text is malformed. Provider numbers are kept
/// as-is even when they disagree with each other.
pub fn parse_plan_response(response: &str) -> Result<ItineraryPlan, ProviderError> {
    let cleaned = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let plan: ItineraryPlan = serde_json::from_str(cleaned).map_err(|e| {
        let err = ProviderError::from_parse(&e);
        warn!(kind = ?err.kind, "Failed to parse itinerary response: {}", e);
        err
    })?;

    let discrepancy = plan.cost_discrepancy();
    if discrepancy.abs() > f64::EPSILON {
        warn!(
            reported = plan.total_estimated_cost,
            discrepancy = discrepancy,
            "Itinerary total differs from the sum of daily costs"
        );
    }

    Ok(plan)
}
