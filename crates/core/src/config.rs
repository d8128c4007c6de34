//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! workflow services, so no code path reads process-wide environment variables
//! during request handling.
//!
//! The two insurance-code sets are configuration rather than hard-coded law:
//! the literals observed in production are carried as defaults only.

use crate::constants::{
    DEFAULT_FUA_INSURANCE_CODES, DEFAULT_SEARCH_DEBOUNCE_MS, DEFAULT_SECURED_INSURANCE_CODES,
};
use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("insurance code in configuration cannot be empty")]
    EmptyInsuranceCode,
}

/// Admission workflow configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AdmissionConfig {
    fua_insurance_codes: BTreeSet<String>,
    secured_insurance_codes: BTreeSet<String>,
    search_debounce: Duration,
}

impl AdmissionConfig {
    /// Create a new `AdmissionConfig`.
    ///
    /// Either code set may be empty (which disables the corresponding gate or
    /// side effect), but individual codes must be non-blank.
    pub fn new(
        fua_insurance_codes: impl IntoIterator<Item = String>,
        secured_insurance_codes: impl IntoIterator<Item = String>,
        search_debounce: Duration,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            fua_insurance_codes: normalise_codes(fua_insurance_codes)?,
            secured_insurance_codes: normalise_codes(secured_insurance_codes)?,
            search_debounce,
        })
    }

    /// Whether the FUA authorization gate applies to this insurance code.
    pub fn fua_applies_to(&self, insurance_code: &str) -> bool {
        self.fua_insurance_codes.contains(insurance_code.trim())
    }

    /// Whether a persisted admission with this insurance code triggers the
    /// best-effort account-securing call.
    pub fn secures_account_for(&self, insurance_code: &str) -> bool {
        self.secured_insurance_codes.contains(insurance_code.trim())
    }

    pub fn search_debounce(&self) -> Duration {
        self.search_debounce
    }
}

fn normalise_codes(
    input: impl IntoIterator<Item = String>,
) -> Result<BTreeSet<String>, ConfigError> {
    let mut codes = BTreeSet::new();
    for code in input {
        let code = code.trim().to_owned();
        if code.is_empty() {
            return Err(ConfigError::EmptyInsuranceCode);
        }
        codes.insert(code);
    }
    Ok(codes)
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            fua_insurance_codes: DEFAULT_FUA_INSURANCE_CODES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            secured_insurance_codes: DEFAULT_SECURED_INSURANCE_CODES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }
}
