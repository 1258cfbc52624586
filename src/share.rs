//! Share links for itineraries
//!
//! A plan travels as `?itinerary=<token>` where the token is the plan's JSON
//! in URL-safe base64 without padding. Links made with the standard base64
//! alphabet (padded, possibly percent-encoded) still decode.

use crate::error::DecodeError;
use crate::models::ItineraryPlan;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

/// Query parameter that carries the encoded plan
pub const SHARE_PARAM: &str = "itinerary";

pub fn encode(plan: &ItineraryPlan) -> crate::Result<String> {
    let json = serde_json::to_vec(plan)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a token back into a plan. All-or-nothing.
pub fn decode(token: &str) -> Result<ItineraryPlan, DecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = decode_bytes(token)?;

    serde_json::from_slice(&bytes).map_err(|e| DecodeError::Payload(e.to_string()))
}

fn decode_bytes(token: &str) -> Result<Vec<u8>, DecodeError> {
    if let Ok(bytes) = URL_SAFE_NO_PAD.decode(token) {
        return Ok(bytes);
    }

    let unescaped = urlencoding::decode(token)
        .map_err(|e| DecodeError::Encoding(e.to_string()))?
        // '+' survives as ' ' when a standard token went through form decoding
        .replace(' ', "+");

    STANDARD
        .decode(unescaped.as_bytes())
        .map_err(|e| DecodeError::Encoding(e.to_string()))
}

/// `base?itinerary=<token>`, replacing any share parameter already present
pub fn share_url(base: &str, plan: &ItineraryPlan) -> crate::Result<String> {
    let token = encode(plan)?;
    let base = strip_share_param(base);
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}={}", base, separator, SHARE_PARAM, token))
}

/// Token carried by an address, if any
pub fn token_from_address(address: &str) -> Option<String> {
    let (_, query) = split_address(address);
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_PARAM)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Address with the share parameter removed; other parameters are kept
pub fn strip_share_param(address: &str) -> String {
    let (path, query) = split_address(address);
    let Some(query) = query else {
        return path.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(SHARE_PARAM))
        .collect();

    if kept.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, kept.join("&"))
    }
}

fn split_address(address: &str) -> (&str, Option<&str>) {
    let address = address.split('#').next().unwrap_or(address);
    match address.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (address, None),
    }
}
