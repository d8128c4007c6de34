//! FUA authorization gate.
//!
//! SIS-class insurance codes require an active FUA (a pre-authorization
//! record created within the last [`crate::constants::FUA_ACTIVE_WINDOW_HOURS`]
//! hours) before the admission may proceed. The gate fails closed: if the
//! check itself errors, the outcome is the same as "no active FUA found" and
//! the user must acknowledge the bypass to continue.

use crate::config::AdmissionConfig;
use crate::ports::FuaAuthorizations;

/// Outcome of evaluating the FUA gate for one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FuaGate {
    /// Insurance code outside the SIS set; no check performed, no warning.
    NotApplicable,
    /// An active FUA exists.
    Active { fua_id: Option<String> },
    /// No active FUA (or the check failed). Blocks unless bypassed.
    Missing,
}

impl FuaGate {
    /// Whether submission may proceed given the user's bypass acknowledgment.
    pub fn permits(&self, bypass_acknowledged: bool) -> bool {
        match self {
            FuaGate::NotApplicable | FuaGate::Active { .. } => true,
            FuaGate::Missing => bypass_acknowledged,
        }
    }

    /// Whether the UI should surface the missing-authorization warning.
    pub fn warns(&self) -> bool {
        matches!(self, FuaGate::Missing)
    }
}

/// Evaluate the gate for the given insurance code and patient.
pub async fn evaluate_fua_gate(
    cfg: &AdmissionConfig,
    fua: &dyn FuaAuthorizations,
    insurance_code: &str,
    patient_id: &str,
) -> FuaGate {
    if !cfg.fua_applies_to(insurance_code) {
        return FuaGate::NotApplicable;
    }

    match fua.check_active(patient_id).await {
        Ok(status) if status.has_fua => FuaGate::Active {
            fua_id: status.fua_id,
        },
        Ok(_) => FuaGate::Missing,
        Err(e) => {
            // Fail closed: an unreachable authorization backend must never
            // silently wave a submission through.
            tracing::warn!(patient_id, "FUA check failed, treating as missing: {e}");
            FuaGate::Missing
        }
    }
}
