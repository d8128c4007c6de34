//! Constants used throughout the admission core crate.
//!
//! Field widths and code sets live here so the persistence derivation, the
//! validation rules and the configuration defaults stay in one place.

/// Insurance codes (SIS class) whose admissions require an active FUA.
///
/// Default for [`crate::config::AdmissionConfig`]; deployments may override.
pub const DEFAULT_FUA_INSURANCE_CODES: [&str; 6] = ["20", "21", "22", "23", "24", "25"];

/// Insurance codes whose admissions trigger best-effort account securing
/// after the order is persisted.
pub const DEFAULT_SECURED_INSURANCE_CODES: [&str; 3] = ["0", "02", "17"];

/// How long a FUA record counts as active, in hours. The authorization
/// backend enforces the window; the constant documents the contract.
pub const FUA_ACTIVE_WINDOW_HOURS: i64 = 3;

/// Trailing debounce applied to search-as-you-type catalog lookups.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 400;

/// Status code a newly created order starts in (open for editing).
pub const INITIAL_ORDER_STATUS_CODE: &str = "2";

/// Persisted width of a ward code: shorter codes are space-padded, longer
/// codes truncated, so the stored value is always exactly this long.
pub const WARD_CODE_WIDTH: usize = 6;

/// Maximum persisted length of an insurance code.
pub const INSURANCE_CODE_MAX: usize = 2;

/// Maximum persisted length of an authorizing-doctor code (trimmed first).
pub const DOCTOR_CODE_MAX: usize = 3;

/// Maximum persisted length of a patient identifier.
pub const PATIENT_ID_MAX: usize = 12;

/// Maximum persisted length of the denormalized patient name.
pub const PATIENT_NAME_MAX: usize = 80;

/// Maximum persisted length of the diagnosis text.
pub const DIAGNOSIS_TEXT_MAX: usize = 120;

/// Maximum persisted length of the companion name.
pub const COMPANION_NAME_MAX: usize = 60;

/// Maximum persisted length of the companion phone (digits only).
pub const COMPANION_PHONE_MAX: usize = 20;

/// Maximum persisted length of the companion address.
pub const COMPANION_ADDRESS_MAX: usize = 100;

/// Default page size for the order list.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
