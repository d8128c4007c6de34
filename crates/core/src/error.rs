//! Error taxonomy for the admission workflow.
//!
//! Two layers: [`GatewayError`] is what a boundary port reports (transport,
//! payload, explicit backend rejection); [`SubmitError`] is what a submission
//! attempt surfaces to the caller, one variant per blocking step. Side-effect
//! failures (account securing, document handoff) never become errors; they
//! are logged at the call site and swallowed.

use crate::validation::FieldErrors;

/// Failure talking to one of the boundary services.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request never produced a usable response (DNS, connect, timeout).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response arrived but could not be interpreted.
    #[error("unexpected response payload: {0}")]
    Payload(String),
    /// The backend answered with a non-success status.
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl GatewayError {
    /// Human-readable message suitable for a toast/alert. For rejections the
    /// backend's own message is surfaced verbatim.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Rejected { message, .. } if !message.trim().is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Why a submission attempt stopped.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Field-level validation failed; recoverable locally, never propagated
    /// past the form.
    #[error("form validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),
    /// The diagnosis-coding service reported the code invalid (or could not
    /// be reached, which is treated the same way).
    #[error("diagnosis code {code:?} failed verification")]
    DiagnosisRejected { code: String },
    /// No active FUA for a SIS-insured patient and no bypass acknowledgment.
    #[error("no active insurance authorization (FUA) for patient {patient_id}")]
    AuthorizationGap { patient_id: String },
    /// Order-id allocation failed; nothing was persisted.
    #[error("order id allocation failed: {0}")]
    Allocation(#[source] GatewayError),
    /// Persistence failed; the allocated id is abandoned and a retry starts
    /// from allocation again.
    #[error("order persistence failed: {0}")]
    Persistence(#[source] GatewayError),
}

pub type SubmitResult<T> = std::result::Result<T, SubmitError>;
