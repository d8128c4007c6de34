//! Request/response DTOs for the REST facade.
//!
//! Core types stay free of OpenAPI concerns; this module owns the wire shape
//! (camelCase JSON, `utoipa` schemas) and the conversions in both directions.

use chrono::NaiveDate;
use hospadm_core::{
    DiagnosisOutcome, FuaGate, OrderDisplay, OrderForm, OrderListPage, OrderRow, OrderSnapshot,
    OriginEntry, PatientFacts, Preflight, StoredOrder, SubmissionReceipt,
};
use hospadm_types::{CatalogRef, OriginType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogRefDto {
    pub code: String,
    #[serde(default)]
    pub label: String,
}

impl CatalogRefDto {
    pub fn from_ref(r: &CatalogRef) -> Self {
        Self {
            code: r.code().to_owned(),
            label: r.label().to_owned(),
        }
    }

    /// An empty or blank code counts as "no selection".
    pub fn into_ref(self) -> Option<CatalogRef> {
        CatalogRef::new(&self.code, &self.label).ok()
    }
}

fn opt_ref_dto(r: &Option<CatalogRef>) -> Option<CatalogRefDto> {
    r.as_ref().map(CatalogRefDto::from_ref)
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OriginEntryDto {
    pub origin: CatalogRefDto,
    pub origin_type: String,
    pub doctor: Option<CatalogRefDto>,
    pub insurance: Option<CatalogRefDto>,
    pub diagnosis_code: Option<String>,
    pub diagnosis_description: Option<String>,
    pub ward: Option<CatalogRefDto>,
}

impl From<OriginEntry> for OriginEntryDto {
    fn from(entry: OriginEntry) -> Self {
        Self {
            origin: CatalogRefDto::from_ref(&entry.origin),
            origin_type: entry.origin_type.wire_code().to_owned(),
            doctor: opt_ref_dto(&entry.doctor),
            insurance: opt_ref_dto(&entry.insurance),
            diagnosis_code: entry.diagnosis_code,
            diagnosis_description: entry.diagnosis_description,
            ward: opt_ref_dto(&entry.ward),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub status: String,
    pub date: String,
    pub time: String,
    pub origin_type: String,
    pub origin: Option<CatalogRefDto>,
    pub ward: Option<CatalogRefDto>,
    pub doctor: Option<CatalogRefDto>,
    pub insurance: Option<CatalogRefDto>,
    pub diagnosis: String,
    pub age: String,
    pub companion_name: String,
    pub companion_phone: String,
    pub companion_address: String,
}

impl From<StoredOrder> for OrderDto {
    fn from(order: StoredOrder) -> Self {
        Self {
            id: order.id,
            patient_id: order.patient_id,
            patient_name: order.patient_name,
            status: order.status.code().to_owned(),
            date: order.date,
            time: order.time,
            origin_type: order.origin_type.wire_code().to_owned(),
            origin: opt_ref_dto(&order.origin),
            ward: opt_ref_dto(&order.ward),
            doctor: opt_ref_dto(&order.doctor),
            insurance: opt_ref_dto(&order.insurance),
            diagnosis: order.diagnosis,
            age: order.age,
            companion_name: order.companion_name,
            companion_phone: order.companion_phone,
            companion_address: order.companion_address,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDisplayDto {
    pub origin: String,
    pub ward: String,
    pub doctor: String,
    pub insurance: String,
    pub diagnosis: String,
}

impl From<OrderDisplay> for OrderDisplayDto {
    fn from(display: OrderDisplay) -> Self {
        Self {
            origin: display.origin,
            ward: display.ward,
            doctor: display.doctor,
            insurance: display.insurance,
            diagnosis: display.diagnosis,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshotDto {
    pub order: OrderDto,
    pub is_editable: bool,
    pub is_locked: bool,
    pub lock_notice: Option<String>,
    pub display: OrderDisplayDto,
}

impl From<OrderSnapshot> for OrderSnapshotDto {
    fn from(snapshot: OrderSnapshot) -> Self {
        Self {
            is_editable: snapshot.is_editable,
            is_locked: snapshot.is_locked,
            lock_notice: snapshot.lock_notice,
            display: snapshot.display.into(),
            order: snapshot.order.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRowDto {
    pub order: OrderDto,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_print: bool,
}

impl From<OrderRow> for OrderRowDto {
    fn from(row: OrderRow) -> Self {
        Self {
            can_edit: row.can_edit,
            can_delete: row.can_delete,
            can_print: row.can_print,
            order: row.order.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderListDto {
    pub rows: Vec<OrderRowDto>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl From<OrderListPage> for OrderListDto {
    fn from(page: OrderListPage) -> Self {
        Self {
            rows: page.rows.into_iter().map(OrderRowDto::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        }
    }
}

/// Form state as submitted by the UI.
#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderFormDto {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub origin_type: String,
    #[serde(default)]
    pub origin: Option<CatalogRefDto>,
    #[serde(default)]
    pub ward: Option<CatalogRefDto>,
    #[serde(default)]
    pub doctor: Option<CatalogRefDto>,
    #[serde(default)]
    pub insurance: Option<CatalogRefDto>,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub companion_name: String,
    #[serde(default)]
    pub companion_phone: String,
    #[serde(default)]
    pub companion_address: String,
}

impl OrderFormDto {
    pub fn into_form(self) -> Result<OrderForm, String> {
        let origin_type =
            OriginType::from_wire_code(&self.origin_type).map_err(|e| e.to_string())?;
        let mut form = OrderForm::new(origin_type);
        form.date = self.date.trim().to_owned();
        form.time = self.time.trim().to_owned();
        form.ward = self.ward.and_then(CatalogRefDto::into_ref);
        form.doctor = self.doctor.and_then(CatalogRefDto::into_ref);
        form.insurance = self.insurance.and_then(CatalogRefDto::into_ref);
        form.diagnosis = self.diagnosis.trim().to_owned();
        form.companion_name = self.companion_name.trim().to_owned();
        form.set_companion_phone(&self.companion_phone);
        form.companion_address = self.companion_address.trim().to_owned();
        // Applied after the type so a newborn submission cannot smuggle an
        // origin record in.
        if origin_type.requires_origin_record() {
            form.origin = self.origin.and_then(CatalogRefDto::into_ref);
        }
        Ok(form)
    }
}

#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub id: String,
    pub full_name: String,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
}

impl PatientDto {
    pub fn into_facts(self) -> Result<PatientFacts, String> {
        let birth_date = NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d")
            .map_err(|_| format!("invalid birth date: {:?}", self.birth_date))?;
        Ok(PatientFacts {
            id: self.id.trim().to_owned(),
            full_name: self.full_name.trim().to_owned(),
            birth_date,
        })
    }
}

#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActingUserDto {
    pub id: String,
    pub display_name: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreflightReq {
    pub form: OrderFormDto,
    pub patient_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct DiagnosisMatchDto {
    pub code: String,
    pub description: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreflightDto {
    pub errors: BTreeMap<String, String>,
    /// `notChecked`, `confirmed`, `ambiguous` or `rejected`.
    pub diagnosis_outcome: String,
    pub diagnosis_canonical: Option<String>,
    pub diagnosis_matches: Vec<DiagnosisMatchDto>,
    /// `notApplicable`, `active` or `missing`; absent when an earlier step
    /// already blocked.
    pub fua_gate: Option<String>,
    pub fua_id: Option<String>,
    pub submittable: bool,
    pub submittable_with_bypass: bool,
}

impl From<Preflight> for PreflightDto {
    fn from(preflight: Preflight) -> Self {
        let submittable = preflight.is_submittable(false);
        let submittable_with_bypass = preflight.is_submittable(true);

        let errors = preflight
            .errors
            .iter()
            .map(|(field, message)| (field.as_str().to_owned(), message.clone()))
            .collect();

        let (diagnosis_outcome, diagnosis_canonical, diagnosis_matches) = match preflight.diagnosis
        {
            DiagnosisOutcome::NotChecked => ("notChecked".to_owned(), None, Vec::new()),
            DiagnosisOutcome::Confirmed { canonical } => ("confirmed".to_owned(), canonical, Vec::new()),
            DiagnosisOutcome::Ambiguous { matches } => (
                "ambiguous".to_owned(),
                None,
                matches
                    .into_iter()
                    .map(|m| DiagnosisMatchDto {
                        code: m.code,
                        description: m.description,
                    })
                    .collect(),
            ),
            DiagnosisOutcome::Rejected { .. } => ("rejected".to_owned(), None, Vec::new()),
        };

        let (fua_gate, fua_id) = match preflight.fua {
            None => (None, None),
            Some(FuaGate::NotApplicable) => (Some("notApplicable".to_owned()), None),
            Some(FuaGate::Active { fua_id }) => (Some("active".to_owned()), fua_id),
            Some(FuaGate::Missing) => (Some("missing".to_owned()), None),
        };

        Self {
            errors,
            diagnosis_outcome,
            diagnosis_canonical,
            diagnosis_matches,
            fua_gate,
            fua_id,
            submittable,
            submittable_with_bypass,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderReq {
    pub form: OrderFormDto,
    pub patient: PatientDto,
    pub user: ActingUserDto,
    #[serde(default)]
    pub fua_bypass_acknowledged: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRes {
    pub order_id: String,
    pub diagnosis: String,
    pub account_secured: Option<bool>,
    pub documents_dispatched: bool,
}

impl From<SubmissionReceipt> for SubmitOrderRes {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            order_id: receipt.order_id,
            diagnosis: receipt.diagnosis,
            account_secured: receipt.account_secured,
            documents_dispatched: receipt.documents_dispatched,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorRes {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorRes {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }
}
