use crate::dsky::Code;
use crate::flight_control::FlightState;
use crate::warn;
use async_trait::async_trait;
use std::time::Duration;
use strum_macros::Display;

/// Telemetry and DSKY context sent to the advisory collaborator.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AdvisoryRequest {
    pub altitude: f64,
    pub velocity: f64,
    pub fuel: f64,
    pub thrust: f64,
    pub program: Code,
    pub verb: Code,
    pub noun: Code,
}

impl AdvisoryRequest {
    pub fn new(flight: &FlightState, program: Code, verb: Code, noun: Code) -> Self {
        Self {
            altitude: flight.altitude,
            velocity: flight.velocity,
            fuel: flight.fuel,
            thrust: flight.thrust,
            program,
            verb,
            noun,
        }
    }

    /// Plain-text telemetry block for prompt-driven services.
    pub fn summary(&self) -> String {
        format!(
            "ALT {:.1} M, VEL {:.1} M/S, FUEL {:.1}%, THRUST {}%, P{} V{} N{}",
            self.altitude, self.velocity, self.fuel, self.thrust, self.program, self.verb, self.noun
        )
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum AdvisoryError {
    /// No collaborator is configured.
    Unavailable,
    Timeout,
    NoConnection,
    #[strum(to_string = "BadResponse: {reason}")]
    BadResponse { reason: String },
}

impl std::error::Error for AdvisoryError {}

impl From<reqwest::Error> for AdvisoryError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            AdvisoryError::Timeout
        } else if value.is_connect() {
            AdvisoryError::NoConnection
        } else {
            AdvisoryError::BadResponse { reason: value.to_string() }
        }
    }
}

/// The external source of free-text guidance (CAPCOM).
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn guidance(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError>;
}

/// Advisor used when no service is configured. Every call fails, so the operator sees
/// the fallback text.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineAdvisor;

#[async_trait]
impl Advisor for OfflineAdvisor {
    async fn guidance(&self, _request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::Unavailable)
    }
}

/// Logged in place of guidance when the collaborator fails or times out.
pub const FALLBACK_MESSAGE: &str = "STATIC INTERFERENCE...";
/// Logged when the collaborator answers with nothing.
pub const EMPTY_MESSAGE: &str = "RADIO SILENCE...";

/// Asks `advisor` for guidance, bounded by `timeout`.
///
/// Never fails: errors and timeouts become [`FALLBACK_MESSAGE`], blank answers
/// [`EMPTY_MESSAGE`].
pub async fn request_guidance(advisor: &dyn Advisor, request: &AdvisoryRequest, timeout: Duration) -> String {
    match tokio::time::timeout(timeout, advisor.guidance(request)).await {
        Ok(Ok(text)) if text.trim().is_empty() => EMPTY_MESSAGE.to_string(),
        Ok(Ok(text)) => text.trim().to_string(),
        Ok(Err(e)) => {
            warn!("Advisory request failed: {e}");
            FALLBACK_MESSAGE.to_string()
        }
        Err(_) => {
            warn!("Advisory request timed out after {}ms", timeout.as_millis());
            FALLBACK_MESSAGE.to_string()
        }
    }
}
