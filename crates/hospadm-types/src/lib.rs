//! Validated value types shared across the admission workspace.
//!
//! These types are constructed through checked constructors and re-validate on
//! deserialization, so downstream crates never see an empty catalog code or an
//! unrecognised origin-type wire code smuggled in through JSON.

use chrono::{Datelike, NaiveDate};

/// Errors that can occur when creating validated catalog types.
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    /// The catalog code was empty or contained only whitespace
    #[error("catalog code cannot be empty")]
    EmptyCode,
    /// The origin-type wire code was not one of the known codes
    #[error("unknown origin-type code: {0}")]
    UnknownOriginType(String),
}

/// A reference into one of the clinical catalogs (ward, doctor, insurance,
/// diagnosis, origin record).
///
/// Carries a non-empty code plus a human-readable label. The label may be
/// empty; the code may not. Read-only views render the pair through
/// [`CatalogRef::display_composite`]; the pair itself is what travels through
/// form state and over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRef {
    code: String,
    label: String,
}

impl CatalogRef {
    /// Creates a new `CatalogRef`.
    ///
    /// Both inputs are trimmed. An empty (or whitespace-only) code is
    /// rejected; an empty label is allowed.
    pub fn new(code: impl AsRef<str>, label: impl AsRef<str>) -> Result<Self, CodeError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(CodeError::EmptyCode);
        }
        Ok(Self {
            code: code.to_owned(),
            label: label.as_ref().trim().to_owned(),
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Composite `"<code> [<label>]"` form used by read-only order views.
    ///
    /// Falls back to the bare code when no label is known.
    pub fn display_composite(&self) -> String {
        if self.label.is_empty() {
            self.code.clone()
        } else {
            format!("{} [{}]", self.code, self.label)
        }
    }
}

impl std::fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_composite())
    }
}

impl serde::Serialize for CatalogRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("CatalogRef", 2)?;
        s.serialize_field("code", &self.code)?;
        s.serialize_field("label", &self.label)?;
        s.end()
    }
}

impl<'de> serde::Deserialize<'de> for CatalogRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            code: String,
            #[serde(default)]
            label: String,
        }
        let raw = Raw::deserialize(deserializer)?;
        CatalogRef::new(&raw.code, &raw.label).map_err(serde::de::Error::custom)
    }
}

/// Classification of where a hospitalization request originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginType {
    Emergency,
    OutpatientConsult,
    Newborn,
}

impl OriginType {
    /// Two-letter code persisted on the order record.
    ///
    /// `"RN"` is the code the backend mandates for newborn admissions; the
    /// emergency and outpatient codes are the canonical codes chosen for this
    /// system.
    pub const fn wire_code(self) -> &'static str {
        match self {
            OriginType::Emergency => "EM",
            OriginType::OutpatientConsult => "CE",
            OriginType::Newborn => "RN",
        }
    }

    pub fn from_wire_code(code: &str) -> Result<Self, CodeError> {
        match code.trim() {
            "EM" => Ok(OriginType::Emergency),
            "CE" => Ok(OriginType::OutpatientConsult),
            "RN" => Ok(OriginType::Newborn),
            other => Err(CodeError::UnknownOriginType(other.to_owned())),
        }
    }

    /// Newborn admissions have no prior clinical encounter to point at, so
    /// they are the one origin type without an origin-record requirement.
    pub fn requires_origin_record(self) -> bool {
        !matches!(self, OriginType::Newborn)
    }
}

impl std::fmt::Display for OriginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OriginType::Emergency => "emergency",
            OriginType::OutpatientConsult => "outpatient consult",
            OriginType::Newborn => "newborn",
        };
        write!(f, "{name}")
    }
}

impl serde::Serialize for OriginType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.wire_code())
    }
}

impl<'de> serde::Deserialize<'de> for OriginType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OriginType::from_wire_code(&s).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle status of a hospitalization order.
///
/// Only the two codes with defined behaviour get their own variants; every
/// other code is carried verbatim so it can round-trip back to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    /// `"2"`: open for editing.
    Open,
    /// `"3"`: finalized, read-only.
    Locked,
    /// Any other status code. Never grants edit rights.
    Other(String),
}

impl OrderStatus {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "2" => OrderStatus::Open,
            "3" => OrderStatus::Locked,
            other => OrderStatus::Other(other.to_owned()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            OrderStatus::Open => "2",
            OrderStatus::Locked => "3",
            OrderStatus::Other(code) => code,
        }
    }

    /// Whether the loader grants edit rights. Unknown codes never do.
    pub fn is_editable(&self) -> bool {
        matches!(self, OrderStatus::Open)
    }

    pub fn is_locked(&self) -> bool {
        !self.is_editable()
    }

    /// Whether the order list offers the edit/delete actions.
    ///
    /// The list treats `"1"` and `"2"` as the editable class, which is wider
    /// than what the loader grants; attempting the action still routes through
    /// the loader's rule.
    pub fn offers_edit_actions(&self) -> bool {
        matches!(self.code(), "1" | "2")
    }
}

impl serde::Serialize for OrderStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

impl<'de> serde::Deserialize<'de> for OrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(OrderStatus::from_code(&s))
    }
}

/// Patient age at admission, broken into whole years, months and days.
///
/// Rendered as `"<Y>a <M>m <D>d"` on the persisted order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeAtAdmission {
    years: u32,
    months: u32,
    days: u32,
}

impl AgeAtAdmission {
    /// Calendar difference between `birth` and `on`.
    ///
    /// Whole months are counted by anniversary (day-of-month clamped for
    /// short months), with the remainder expressed in days. A birth date in
    /// the future of `on` yields a zero age rather than an error; the backend
    /// treats the age string as display-only.
    pub fn between(birth: NaiveDate, on: NaiveDate) -> Self {
        let zero = Self {
            years: 0,
            months: 0,
            days: 0,
        };
        if on <= birth {
            return zero;
        }

        let mut months_total =
            (on.year() - birth.year()) * 12 + on.month() as i32 - birth.month() as i32;
        if on.day() < birth.day() {
            months_total -= 1;
        }
        if months_total < 0 {
            return zero;
        }

        // Anchor: birth date shifted forward by the whole months, clamped to
        // the target month's length (31 Jan + 1 month -> 28/29 Feb).
        let shifted = birth.month0() as i32 + months_total;
        let anchor_year = birth.year() + shifted.div_euclid(12);
        let anchor_month = (shifted.rem_euclid(12) + 1) as u32;
        let anchor_day = birth.day().min(days_in_month(anchor_year, anchor_month));
        let anchor =
            NaiveDate::from_ymd_opt(anchor_year, anchor_month, anchor_day).unwrap_or(birth);

        Self {
            years: (months_total / 12) as u32,
            months: (months_total % 12) as u32,
            days: (on - anchor).num_days().max(0) as u32,
        }
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn days(&self) -> u32 {
        self.days
    }
}

impl std::fmt::Display for AgeAtAdmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}a {}m {}d", self.years, self.months, self.days)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
            if leap {
                29
            } else {
                28
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn catalog_ref_rejects_empty_code() {
        assert!(CatalogRef::new("   ", "Medicina").is_err());
        assert!(CatalogRef::new("", "").is_err());
    }

    #[test]
    fn catalog_ref_trims_and_formats_composite() {
        let r = CatalogRef::new(" MED01 ", " Medicina Interna ").unwrap();
        assert_eq!(r.code(), "MED01");
        assert_eq!(r.display_composite(), "MED01 [Medicina Interna]");

        let bare = CatalogRef::new("MED01", "").unwrap();
        assert_eq!(bare.display_composite(), "MED01");
    }

    #[test]
    fn catalog_ref_deserialize_revalidates() {
        let ok: CatalogRef = serde_json::from_str(r#"{"code":"D12","label":"Dr. Rojas"}"#).unwrap();
        assert_eq!(ok.code(), "D12");
        let err = serde_json::from_str::<CatalogRef>(r#"{"code":"  ","label":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn origin_type_wire_codes_round_trip() {
        for ot in [
            OriginType::Emergency,
            OriginType::OutpatientConsult,
            OriginType::Newborn,
        ] {
            assert_eq!(OriginType::from_wire_code(ot.wire_code()).unwrap(), ot);
        }
        assert_eq!(OriginType::Newborn.wire_code(), "RN");
        assert!(OriginType::from_wire_code("XX").is_err());
    }

    #[test]
    fn only_newborn_skips_origin_record() {
        assert!(OriginType::Emergency.requires_origin_record());
        assert!(OriginType::OutpatientConsult.requires_origin_record());
        assert!(!OriginType::Newborn.requires_origin_record());
    }

    #[test]
    fn status_editability_is_fail_safe() {
        assert!(OrderStatus::from_code("2").is_editable());
        assert!(!OrderStatus::from_code("3").is_editable());
        assert!(!OrderStatus::from_code("1").is_editable());
        assert!(!OrderStatus::from_code("9").is_editable());
        assert!(!OrderStatus::from_code("").is_editable());
    }

    #[test]
    fn list_edit_class_is_wider_than_loader_rule() {
        assert!(OrderStatus::from_code("1").offers_edit_actions());
        assert!(OrderStatus::from_code("2").offers_edit_actions());
        assert!(!OrderStatus::from_code("3").offers_edit_actions());
        assert!(!OrderStatus::from_code("0").offers_edit_actions());
    }

    #[test]
    fn status_preserves_unknown_codes() {
        let s = OrderStatus::from_code("7");
        assert_eq!(s.code(), "7");
        assert!(s.is_locked());
    }

    #[test]
    fn age_simple_difference() {
        let age = AgeAtAdmission::between(date(1990, 3, 10), date(2024, 5, 20));
        assert_eq!((age.years(), age.months(), age.days()), (34, 2, 10));
        assert_eq!(age.to_string(), "34a 2m 10d");
    }

    #[test]
    fn age_clamps_anniversary_in_short_months() {
        // 31 Jan -> 1 Mar: one month (anniversary clamped to 29 Feb) plus a day.
        let age = AgeAtAdmission::between(date(2024, 1, 31), date(2024, 3, 1));
        assert_eq!((age.years(), age.months(), age.days()), (0, 1, 1));
    }

    #[test]
    fn age_counts_partial_months_across_year_boundary() {
        let age = AgeAtAdmission::between(date(2023, 11, 15), date(2024, 1, 10));
        assert_eq!((age.years(), age.months(), age.days()), (0, 1, 26));
    }

    #[test]
    fn age_newborn_same_day_is_zero() {
        let d = date(2024, 6, 1);
        let age = AgeAtAdmission::between(d, d);
        assert_eq!(age.to_string(), "0a 0m 0d");
    }

    #[test]
    fn age_future_birth_date_clamps_to_zero() {
        let age = AgeAtAdmission::between(date(2030, 1, 1), date(2024, 1, 1));
        assert_eq!(age.to_string(), "0a 0m 0d");
    }
}
