//! Field derivation for persistence.
//!
//! The backend stores fixed-width codes and bounded text columns. Oversized
//! values are truncated, never rejected: validation has already run by the
//! time a record is derived, and the widths here are storage limits, not
//! business rules. Truncation is by character, so a multi-byte label can
//! never split a UTF-8 sequence.

use crate::constants::{
    COMPANION_ADDRESS_MAX, COMPANION_NAME_MAX, COMPANION_PHONE_MAX, DIAGNOSIS_TEXT_MAX,
    DOCTOR_CODE_MAX, INITIAL_ORDER_STATUS_CODE, INSURANCE_CODE_MAX, PATIENT_ID_MAX,
    PATIENT_NAME_MAX, WARD_CODE_WIDTH,
};
use crate::context::PatientFacts;
use crate::form::OrderForm;
use crate::ports::OrderRecord;
use chrono::NaiveDate;
use hospadm_types::{AgeAtAdmission, CatalogRef, OriginType};

/// Truncate to at most `max` characters.
pub fn clip(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Ward codes are stored at a fixed width: truncated if longer, space-padded
/// if shorter, so the persisted value is always exactly
/// [`WARD_CODE_WIDTH`] characters.
pub fn fixed_width_ward(code: &str) -> String {
    let mut out = clip(code, WARD_CODE_WIDTH);
    while out.chars().count() < WARD_CODE_WIDTH {
        out.push(' ');
    }
    out
}

fn code_of(field: &Option<CatalogRef>) -> &str {
    field.as_ref().map(CatalogRef::code).unwrap_or("")
}

/// Build the persistence record for a validated form.
///
/// `diagnosis_text` is the post-verification text (canonicalised when the
/// coding service returned exactly one match, the user's entry otherwise).
/// `admitted_on` anchors the age computation to the submission date.
pub fn derive_record(
    form: &OrderForm,
    patient: &PatientFacts,
    diagnosis_text: &str,
    order_id: &str,
    admitted_on: NaiveDate,
) -> OrderRecord {
    // The origin-type code always follows the selected type; a newborn
    // admission drops any origin record that was picked before switching.
    let origin_code = if form.origin_type == OriginType::Newborn {
        String::new()
    } else {
        code_of(&form.origin).to_owned()
    };

    let age = AgeAtAdmission::between(patient.birth_date, admitted_on);

    OrderRecord {
        id: order_id.to_owned(),
        patient_id: clip(patient.id.trim(), PATIENT_ID_MAX),
        patient_name: clip(patient.full_name.trim(), PATIENT_NAME_MAX),
        status: INITIAL_ORDER_STATUS_CODE.to_owned(),
        origin_type: form.origin_type.wire_code().to_owned(),
        origin_code,
        ward_code: fixed_width_ward(code_of(&form.ward)),
        doctor_code: clip(code_of(&form.doctor).trim(), DOCTOR_CODE_MAX),
        insurance_code: clip(code_of(&form.insurance).trim(), INSURANCE_CODE_MAX),
        diagnosis: clip(diagnosis_text.trim(), DIAGNOSIS_TEXT_MAX),
        date: form.date.trim().to_owned(),
        time: form.time.trim().to_owned(),
        age: age.to_string(),
        companion_name: clip(form.companion_name.trim(), COMPANION_NAME_MAX),
        companion_phone: clip(form.companion_phone.trim(), COMPANION_PHONE_MAX),
        companion_address: clip(form.companion_address.trim(), COMPANION_ADDRESS_MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientFacts {
        PatientFacts {
            id: "P-000000123456789".into(), // longer than the stored width
            full_name: "Rosa Mamani Flores".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 10).unwrap(),
        }
    }

    fn form() -> OrderForm {
        let mut form = OrderForm::new(OriginType::Emergency);
        form.date = "2024-05-20".into();
        form.time = "14:30".into();
        form.origin = Some(CatalogRef::new("EM0042", "Emergencia").unwrap());
        form.ward = Some(CatalogRef::new("MED01", "Medicina").unwrap());
        form.doctor = Some(CatalogRef::new("041", "Dr. Rojas").unwrap());
        form.insurance = Some(CatalogRef::new("02", "SIS").unwrap());
        form.diagnosis = "J45 - Asma".into();
        form.companion_name = "Maria Quispe".into();
        form.companion_phone = "999111222".into();
        form.companion_address = "Av. Grau 123".into();
        form
    }

    fn on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn ward_code_is_always_exactly_six_chars() {
        assert_eq!(fixed_width_ward("MED01"), "MED01 ");
        assert_eq!(fixed_width_ward("MEDICINA1"), "MEDICI");
        assert_eq!(fixed_width_ward("MED001"), "MED001");
        assert_eq!(fixed_width_ward(""), "      ");
        // Deterministic: re-deriving from an oversized code gives the same value.
        assert_eq!(fixed_width_ward("MEDICINA1"), fixed_width_ward("MEDICINA1"));
    }

    #[test]
    fn clip_is_character_safe() {
        assert_eq!(clip("Niño recién nacido", 6), "Niño r");
        assert_eq!(clip("abc", 10), "abc");
    }

    #[test]
    fn derived_record_carries_clipped_codes_and_age() {
        let record = derive_record(&form(), &patient(), "J45 - Asma", "000123", on());
        assert_eq!(record.id, "000123");
        assert_eq!(record.status, "2");
        assert_eq!(record.origin_type, "EM");
        assert_eq!(record.origin_code, "EM0042");
        assert_eq!(record.ward_code, "MED01 ");
        assert_eq!(record.doctor_code, "041");
        assert_eq!(record.insurance_code, "02");
        assert_eq!(record.age, "34a 2m 10d");
        assert_eq!(record.patient_id.chars().count(), 12);
    }

    #[test]
    fn newborn_forces_rn_and_empty_origin_code() {
        let mut f = form();
        f.origin_type = OriginType::Newborn;
        // Even with a stale origin still present, the derived record drops it.
        f.origin = Some(CatalogRef::new("EM0042", "Emergencia").unwrap());
        let record = derive_record(&f, &patient(), "P07", "000124", on());
        assert_eq!(record.origin_type, "RN");
        assert_eq!(record.origin_code, "");
    }

    #[test]
    fn oversized_doctor_and_insurance_codes_are_truncated() {
        let mut f = form();
        f.doctor = Some(CatalogRef::new("  04177  ", "Dr. Rojas").unwrap());
        f.insurance = Some(CatalogRef::new("0217", "SIS").unwrap());
        let record = derive_record(&f, &patient(), "J45", "000125", on());
        assert_eq!(record.doctor_code, "041");
        assert_eq!(record.insurance_code, "02");
    }

    #[test]
    fn companion_fields_are_bounded_not_rejected() {
        let mut f = form();
        f.companion_name = "N".repeat(200);
        f.companion_address = "A".repeat(200);
        let record = derive_record(&f, &patient(), "J45", "000126", on());
        assert_eq!(record.companion_name.chars().count(), 60);
        assert_eq!(record.companion_address.chars().count(), 100);
    }
}
