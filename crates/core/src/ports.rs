//! Boundary ports of the admission core.
//!
//! Every external collaborator (catalogs, FUA authorizations, diagnosis
//! coding, the order-record backend, the print service) is consumed through
//! one of these traits. The HTTP implementations live in `hospadm-gateways`;
//! tests drive the workflow with in-memory implementations.

use crate::error::GatewayError;
use async_trait::async_trait;
use hospadm_types::{CatalogRef, OrderStatus, OriginType};

/// One of the flat lookup catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Ward,
    Doctor,
    Insurance,
    Diagnosis,
}

impl CatalogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogKind::Ward => "ward",
            CatalogKind::Doctor => "doctor",
            CatalogKind::Insurance => "insurance",
            CatalogKind::Diagnosis => "diagnosis",
        }
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ward" => Ok(CatalogKind::Ward),
            "doctor" => Ok(CatalogKind::Doctor),
            "insurance" => Ok(CatalogKind::Insurance),
            "diagnosis" => Ok(CatalogKind::Diagnosis),
            other => Err(format!("unknown catalog kind: {other}")),
        }
    }
}

/// An origin-record search hit: a prior clinical encounter plus the
/// denormalized data used to prefill the order form.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OriginEntry {
    pub origin: CatalogRef,
    pub origin_type: OriginType,
    pub doctor: Option<CatalogRef>,
    pub insurance: Option<CatalogRef>,
    pub diagnosis_code: Option<String>,
    pub diagnosis_description: Option<String>,
    /// Suggested destination ward; offered to the user, never force-applied.
    pub ward: Option<CatalogRef>,
}

impl OriginEntry {
    /// `"<code> - <description>"` text for the diagnosis field, if the origin
    /// carries one.
    pub fn diagnosis_text(&self) -> Option<String> {
        let code = self.diagnosis_code.as_deref()?.trim();
        if code.is_empty() {
            return None;
        }
        match self.diagnosis_description.as_deref().map(str::trim) {
            Some(desc) if !desc.is_empty() => Some(format!("{code} - {desc}")),
            _ => Some(code.to_owned()),
        }
    }
}

/// Search-as-you-type access to the clinical catalogs. An empty result list
/// is a valid, non-error outcome.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Search origin records, optionally scoped to an origin type.
    async fn search_origins(
        &self,
        query: &str,
        scope: Option<OriginType>,
    ) -> Result<Vec<OriginEntry>, GatewayError>;

    /// Search one of the flat catalogs.
    async fn search(
        &self,
        kind: CatalogKind,
        query: &str,
    ) -> Result<Vec<CatalogRef>, GatewayError>;
}

/// Outcome of a FUA (insurance pre-authorization) lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuaStatus {
    pub has_fua: bool,
    pub fua_id: Option<String>,
}

/// Per-patient check for an active FUA record.
#[async_trait]
pub trait FuaAuthorizations: Send + Sync {
    async fn check_active(&self, patient_id: &str) -> Result<FuaStatus, GatewayError>;
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct DiagnosisMatch {
    pub code: String,
    pub description: String,
}

/// Verdict of the diagnosis-coding verification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisVerdict {
    pub valid: bool,
    pub matches: Vec<DiagnosisMatch>,
}

#[async_trait]
pub trait DiagnosisVerification: Send + Sync {
    async fn verify(&self, code: &str) -> Result<DiagnosisVerdict, GatewayError>;
}

/// A hospitalization order as the backend stores it, with denormalized
/// display names resolved.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoredOrder {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub status: OrderStatus,
    pub date: String,
    pub time: String,
    pub origin_type: OriginType,
    pub origin: Option<CatalogRef>,
    pub ward: Option<CatalogRef>,
    pub doctor: Option<CatalogRef>,
    pub insurance: Option<CatalogRef>,
    pub diagnosis: String,
    /// Age at admission, `"<Y>a <M>m <D>d"`.
    pub age: String,
    pub companion_name: String,
    pub companion_phone: String,
    pub companion_address: String,
}

/// The fully-derived, width-clipped record sent to the backend on creation.
/// Built exclusively by [`crate::persist::derive_record`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub status: String,
    pub origin_type: String,
    /// Empty for newborn admissions.
    pub origin_code: String,
    /// Always exactly six characters, space-padded.
    pub ward_code: String,
    pub doctor_code: String,
    pub insurance_code: String,
    pub diagnosis: String,
    pub date: String,
    pub time: String,
    pub age: String,
    pub companion_name: String,
    pub companion_phone: String,
    pub companion_address: String,
}

/// One page of a patient's orders.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<StoredOrder>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// Query for [`OrderRecords::list_for_patient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListRequest {
    pub patient_id: String,
    pub page: u32,
    pub page_size: u32,
    pub filter: String,
}

/// Best-effort account-securing request fired after persistence for the
/// configured insurance codes. The order id addresses the endpoint; the
/// remaining fields form the request body.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureAccountRequest {
    #[serde(skip)]
    pub order_id: String,
    pub patient_id: String,
    pub insurance_code: String,
    pub user: String,
    pub name: String,
}

/// The order-record backend.
#[async_trait]
pub trait OrderRecords: Send + Sync {
    async fn load(&self, order_id: &str) -> Result<StoredOrder, GatewayError>;

    async fn list_for_patient(&self, req: &OrderListRequest) -> Result<OrderPage, GatewayError>;

    /// Allocate the identifier for a new order. An allocated id that never
    /// gets persisted is abandoned, not reused.
    async fn allocate_id(&self) -> Result<String, GatewayError>;

    async fn create(&self, record: &OrderRecord) -> Result<(), GatewayError>;

    async fn secure_account(&self, req: &SecureAccountRequest) -> Result<(), GatewayError>;
}

/// External print/merge service for the admission document pack.
#[async_trait]
pub trait AdmissionDocuments: Send + Sync {
    /// Hand off the three admission documents (order, consent, filiation
    /// sheet) for the given order. Fire-and-forget from the workflow's point
    /// of view.
    async fn dispatch_pack(&self, order_id: &str, requested_by: &str)
        -> Result<(), GatewayError>;
}
