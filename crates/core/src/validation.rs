//! Form validation rules.
//!
//! [`validate`] is pure and synchronous: it performs no I/O, never panics and
//! only returns a structured field-error map. A non-empty map means the form
//! is not submittable.
//!
//! Required regardless of origin type: companion name, phone and address,
//! admission date and time. The selection fields (ward, authorizing doctor,
//! insurance, diagnosis) are always required too; the origin record is
//! required for every origin type except newborn, which has no prior
//! encounter to reference.

use crate::form::{FormField, OrderForm};
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;

/// Field-level validation errors, keyed by form field.
pub type FieldErrors = BTreeMap<FormField, String>;

/// Validate the current form state.
pub fn validate(form: &OrderForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.companion_name.trim().is_empty() {
        errors.insert(FormField::CompanionName, "companion name is required".into());
    }
    if form.companion_phone.trim().is_empty() {
        errors.insert(
            FormField::CompanionPhone,
            "companion phone is required".into(),
        );
    }
    if form.companion_address.trim().is_empty() {
        errors.insert(
            FormField::CompanionAddress,
            "companion address is required".into(),
        );
    }

    if form.date.trim().is_empty() {
        errors.insert(FormField::Date, "admission date is required".into());
    } else if !is_iso_date(&form.date) {
        errors.insert(
            FormField::Date,
            "admission date must be a valid YYYY-MM-DD date".into(),
        );
    }

    if form.time.trim().is_empty() {
        errors.insert(FormField::Time, "admission time is required".into());
    } else if !is_hhmm_time(&form.time) {
        errors.insert(
            FormField::Time,
            "admission time must be a valid HH:MM time".into(),
        );
    }

    if form.ward.is_none() {
        errors.insert(FormField::Ward, "destination ward is required".into());
    }
    if form.doctor.is_none() {
        errors.insert(
            FormField::AuthorizingDoctor,
            "authorizing doctor is required".into(),
        );
    }
    if form.insurance.is_none() {
        errors.insert(FormField::Insurance, "insurance/financing is required".into());
    }
    if form.diagnosis.trim().is_empty() {
        errors.insert(FormField::Diagnosis, "diagnosis is required".into());
    }

    if form.origin_type.requires_origin_record() && form.origin.is_none() {
        errors.insert(
            FormField::HospitalizationOrigin,
            "hospitalization origin is required".into(),
        );
    }

    errors
}

/// Strict `YYYY-MM-DD`: fixed width, zero-padded, and a real calendar date.
fn is_iso_date(value: &str) -> bool {
    let b = value.as_bytes();
    let shape_ok = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit());
    shape_ok && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Strict `HH:MM`: fixed width, zero-padded, 24-hour.
fn is_hhmm_time(value: &str) -> bool {
    let b = value.as_bytes();
    let shape_ok = b.len() == 5
        && b[2] == b':'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 2 || c.is_ascii_digit());
    shape_ok && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospadm_types::{CatalogRef, OriginType};

    /// A form that passes every rule for the given origin type.
    fn complete_form(origin_type: OriginType) -> OrderForm {
        let mut form = OrderForm::new(origin_type);
        form.date = "2024-05-20".into();
        form.time = "14:30".into();
        form.ward = Some(CatalogRef::new("MED01", "Medicina").unwrap());
        form.doctor = Some(CatalogRef::new("041", "Dr. Rojas").unwrap());
        form.insurance = Some(CatalogRef::new("02", "SIS").unwrap());
        form.diagnosis = "J45 - Asma".into();
        form.companion_name = "Maria Quispe".into();
        form.companion_phone = "999111222".into();
        form.companion_address = "Av. Grau 123".into();
        if origin_type.requires_origin_record() {
            form.origin = Some(CatalogRef::new("EM0042", "Emergencia").unwrap());
        }
        form
    }

    #[test]
    fn complete_forms_validate_cleanly() {
        for ot in [
            OriginType::Emergency,
            OriginType::OutpatientConsult,
            OriginType::Newborn,
        ] {
            assert!(validate(&complete_form(ot)).is_empty(), "{ot}");
        }
    }

    #[test]
    fn newborn_never_requires_origin_record() {
        let mut form = complete_form(OriginType::Newborn);
        form.origin = None;
        let errors = validate(&form);
        assert!(!errors.contains_key(&FormField::HospitalizationOrigin));
        assert!(errors.is_empty());
    }

    #[test]
    fn other_origin_types_require_origin_record() {
        for ot in [OriginType::Emergency, OriginType::OutpatientConsult] {
            let mut form = complete_form(ot);
            form.origin = None;
            let errors = validate(&form);
            assert!(
                errors.contains_key(&FormField::HospitalizationOrigin),
                "{ot}"
            );
        }
    }

    #[test]
    fn companion_and_datetime_fields_required_for_every_origin_type() {
        for ot in [
            OriginType::Emergency,
            OriginType::OutpatientConsult,
            OriginType::Newborn,
        ] {
            let mut form = complete_form(ot);
            form.companion_name.clear();
            form.companion_phone.clear();
            form.companion_address.clear();
            form.date.clear();
            form.time.clear();
            let errors = validate(&form);
            for field in [
                FormField::CompanionName,
                FormField::CompanionPhone,
                FormField::CompanionAddress,
                FormField::Date,
                FormField::Time,
            ] {
                assert!(errors.contains_key(&field), "{ot} missing {field}");
            }
        }
    }

    #[test]
    fn newborn_still_requires_ward_doctor_insurance_diagnosis() {
        let mut form = complete_form(OriginType::Newborn);
        form.ward = None;
        form.doctor = None;
        form.insurance = None;
        form.diagnosis.clear();
        let errors = validate(&form);
        for field in [
            FormField::Ward,
            FormField::AuthorizingDoctor,
            FormField::Insurance,
            FormField::Diagnosis,
        ] {
            assert!(errors.contains_key(&field), "missing {field}");
        }
    }

    #[test]
    fn date_format_is_strict() {
        let mut form = complete_form(OriginType::Emergency);
        for bad in ["20-05-2024", "2024/05/20", "2024-5-20", "2024-02-30", "2024-13-01"] {
            form.date = bad.into();
            assert!(
                validate(&form).contains_key(&FormField::Date),
                "accepted {bad:?}"
            );
        }
        form.date = "2024-02-29".into(); // leap day
        assert!(!validate(&form).contains_key(&FormField::Date));
    }

    #[test]
    fn time_format_is_strict() {
        let mut form = complete_form(OriginType::Emergency);
        for bad in ["9:05", "24:00", "14:60", "14.30", "14:3"] {
            form.time = bad.into();
            assert!(
                validate(&form).contains_key(&FormField::Time),
                "accepted {bad:?}"
            );
        }
        for good in ["00:00", "23:59", "09:05"] {
            form.time = good.into();
            assert!(
                !validate(&form).contains_key(&FormField::Time),
                "rejected {good:?}"
            );
        }
    }

    #[test]
    fn validation_is_pure() {
        let form = complete_form(OriginType::Emergency);
        let before = form.clone();
        let _ = validate(&form);
        assert_eq!(form, before);
    }
}
