//! Order form state.
//!
//! [`OrderForm`] is the single source of truth the validation rules and the
//! submission workflow read from. Mutations that carry normalisation rules
//! (phone stripping, origin prefill) go through methods rather than raw field
//! writes so the rules cannot be skipped.

use crate::ports::OriginEntry;
use hospadm_types::{CatalogRef, OriginType};

/// A field of the hospitalization-order form, used as the key of the
/// validation error map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Date,
    Time,
    HospitalizationOrigin,
    Ward,
    AuthorizingDoctor,
    Insurance,
    Diagnosis,
    CompanionName,
    CompanionPhone,
    CompanionAddress,
}

impl FormField {
    /// Stable key used in error maps and API payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Date => "date",
            FormField::Time => "time",
            FormField::HospitalizationOrigin => "hospitalizationOrigin",
            FormField::Ward => "ward",
            FormField::AuthorizingDoctor => "authorizingDoctor",
            FormField::Insurance => "insurance",
            FormField::Diagnosis => "diagnosis",
            FormField::CompanionName => "companionName",
            FormField::CompanionPhone => "companionPhone",
            FormField::CompanionAddress => "companionAddress",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for FormField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Current state of the hospitalization-order form.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderForm {
    /// Admission date, `YYYY-MM-DD`.
    pub date: String,
    /// Admission time, `HH:MM` (24-hour).
    pub time: String,
    pub origin_type: OriginType,
    /// Prior clinical encounter the admission originates from. Not required
    /// (and cleared) for newborn admissions.
    pub origin: Option<CatalogRef>,
    /// Destination ward.
    pub ward: Option<CatalogRef>,
    pub doctor: Option<CatalogRef>,
    pub insurance: Option<CatalogRef>,
    /// Free-text diagnosis, typically `"<code> - <description>"`.
    pub diagnosis: String,
    pub companion_name: String,
    pub companion_phone: String,
    pub companion_address: String,
}

impl OrderForm {
    pub fn new(origin_type: OriginType) -> Self {
        Self {
            date: String::new(),
            time: String::new(),
            origin_type,
            origin: None,
            ward: None,
            doctor: None,
            insurance: None,
            diagnosis: String::new(),
            companion_name: String::new(),
            companion_phone: String::new(),
            companion_address: String::new(),
        }
    }

    /// Switch the origin type. Newborn admissions have no origin record, so
    /// selecting Newborn clears any previously chosen one.
    pub fn set_origin_type(&mut self, origin_type: OriginType) {
        self.origin_type = origin_type;
        if origin_type == OriginType::Newborn {
            self.origin = None;
        }
    }

    /// Store the companion phone, stripping non-digit characters at input
    /// time. Stripping is idempotent.
    pub fn set_companion_phone(&mut self, raw: &str) {
        self.companion_phone = normalize_phone(raw);
    }

    /// Apply an origin-record selection as one atomic set of field updates.
    ///
    /// The authorizing doctor, diagnosis and insurance are overwritten with
    /// the origin's denormalized data (including being emptied when the
    /// origin carries none) so the form always reflects the selected
    /// encounter. The suggested ward stays on the entry for the caller to
    /// offer; it is not force-applied.
    pub fn apply_origin_selection(&mut self, entry: &OriginEntry) {
        self.origin = Some(entry.origin.clone());
        self.doctor = entry.doctor.clone();
        self.insurance = entry.insurance.clone();
        self.diagnosis = entry.diagnosis_text().unwrap_or_default();
    }

    /// Leading code token of the diagnosis text (`"J45 - Asthma"` -> `"J45"`).
    pub fn diagnosis_code(&self) -> &str {
        self.diagnosis.split_whitespace().next().unwrap_or("")
    }
}

impl Default for OrderForm {
    fn default() -> Self {
        Self::new(OriginType::Emergency)
    }
}

/// Digits-only normalisation for phone input. Re-applying to an already
/// clean string is a no-op.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
