//! Acting-user context and patient facts.
//!
//! The workflow never reads the current user or auth token from ambient
//! storage; callers build a [`SessionContext`] once (at login / request entry)
//! and pass it in explicitly. This keeps the workflow testable without a
//! simulated browser session.

use chrono::NaiveDate;

/// The authenticated user on whose behalf workflow operations run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActingUser {
    /// Login identifier recorded on account-securing requests.
    pub id: String,
    /// Display name stamped on generated documents.
    pub display_name: String,
}

/// Everything the workflow needs to know about the current session.
#[derive(Clone, Debug)]
pub struct SessionContext {
    pub user: ActingUser,
    /// Bearer token forwarded to the boundary services.
    pub auth_token: String,
}

/// Facts about the patient being admitted, resolved by the patient-lookup
/// collaborator before the order form opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientFacts {
    pub id: String,
    /// Full name, denormalized onto the order at write time.
    pub full_name: String,
    /// Birth date; the age-at-admission string is computed from it as of
    /// submission time.
    pub birth_date: NaiveDate,
}
