//! # Hospadm Core
//!
//! Business logic for the hospital admission-order workflow:
//! - Form state and pure validation rules
//! - FUA (insurance pre-authorization) gating
//! - The submission workflow (validate, re-verify diagnosis, gate, allocate,
//!   derive, persist, secure, hand off documents)
//! - Order loading with status-derived editability
//! - Paginated order listing with status-gated actions
//! - Debounced, recency-guarded catalog search
//!
//! **No API or transport concerns**: HTTP endpoints belong in `api-rest`, and
//! the `reqwest` implementations of the boundary ports in `hospadm-gateways`.

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod form;
pub mod fua;
pub mod listing;
pub mod loader;
pub mod persist;
pub mod ports;
pub mod search;
pub mod validation;
pub mod workflow;

pub use config::{AdmissionConfig, ConfigError};
pub use context::{ActingUser, PatientFacts, SessionContext};
pub use error::{GatewayError, SubmitError, SubmitResult};
pub use form::{normalize_phone, FormField, OrderForm};
pub use fua::{evaluate_fua_gate, FuaGate};
pub use listing::{OrderListPage, OrderListState, OrderListing, OrderRow};
pub use loader::{OrderDisplay, OrderLoader, OrderSnapshot};
pub use ports::{
    AdmissionDocuments, CatalogKind, CatalogSearch, DiagnosisMatch, DiagnosisVerdict,
    DiagnosisVerification, FuaAuthorizations, FuaStatus, OrderListRequest, OrderPage, OrderRecord,
    OrderRecords, OriginEntry, SecureAccountRequest, StoredOrder,
};
pub use search::{CatalogSearchSession, DebouncedSearch};
pub use validation::{validate, FieldErrors};
pub use workflow::{
    DiagnosisOutcome, OrderWorkflow, Preflight, SubmissionReceipt, SubmissionRequest,
};
