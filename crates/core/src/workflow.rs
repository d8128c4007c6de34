//! Order submission workflow.
//!
//! The steps run strictly in order, each gating the next:
//!
//! 1. field validation;
//! 2. diagnosis re-verification (outpatient-consult origin only);
//! 3. FUA authorization gate;
//! 4. user confirmation, owned by the caller: [`OrderWorkflow::preflight`]
//!    feeds the confirmation dialog and is re-derived from current form state
//!    every time, so re-opening the dialog can never act on stale gates;
//! 5. order-id allocation;
//! 6. field derivation (codes forced, widths clipped, age computed);
//! 7. persistence;
//! 8. best-effort account securing for the configured insurance codes;
//! 9. document-pack handoff and return to the order list.
//!
//! Steps 1–3 fail closed and create no state. Steps 5–7 mutate state
//! sequentially with no rollback: an allocation followed by a failed
//! persistence leaves an orphaned id, which is accepted; the next attempt
//! allocates a fresh one. Step 8 and step 9 failures are logged and
//! swallowed; they never undo a successful persistence.

use crate::config::AdmissionConfig;
use crate::context::{PatientFacts, SessionContext};
use crate::error::{SubmitError, SubmitResult};
use crate::form::OrderForm;
use crate::fua::{evaluate_fua_gate, FuaGate};
use crate::persist::derive_record;
use crate::ports::{
    AdmissionDocuments, DiagnosisMatch, DiagnosisVerification, FuaAuthorizations, OrderRecords,
    SecureAccountRequest,
};
use crate::validation::{validate, FieldErrors};
use chrono::Utc;
use hospadm_types::{CatalogRef, OriginType};
use std::sync::Arc;

/// Outcome of the diagnosis re-verification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosisOutcome {
    /// Origin type is not outpatient consult; the service is not consulted.
    NotChecked,
    /// Verified. `canonical` is the `"code - description"` replacement when
    /// the service returned exactly one match.
    Confirmed { canonical: Option<String> },
    /// More than one match: the user is warned but submission proceeds with
    /// the text as entered.
    Ambiguous { matches: Vec<DiagnosisMatch> },
    /// Explicitly invalid, or the service could not be consulted. Blocks.
    Rejected { code: String },
}

/// Result of steps 1–3, re-derived from current form state on every call.
/// This is what the confirmation dialog renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Preflight {
    pub errors: FieldErrors,
    pub diagnosis: DiagnosisOutcome,
    /// `None` when an earlier step already blocked and the gate was not
    /// evaluated.
    pub fua: Option<FuaGate>,
}

impl Preflight {
    /// Whether the confirmation dialog's confirm action should be enabled.
    pub fn is_submittable(&self, fua_bypass_acknowledged: bool) -> bool {
        self.errors.is_empty()
            && !matches!(self.diagnosis, DiagnosisOutcome::Rejected { .. })
            && self
                .fua
                .as_ref()
                .is_some_and(|gate| gate.permits(fua_bypass_acknowledged))
    }
}

/// A confirmed submission attempt.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub form: OrderForm,
    pub patient: PatientFacts,
    /// The "hospitalize anyway" checkbox for a missing FUA.
    pub fua_bypass_acknowledged: bool,
}

/// What a successful submission hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub order_id: String,
    /// The diagnosis text as persisted (canonicalised when verification
    /// returned a single match).
    pub diagnosis: String,
    /// `None` when the insurance code does not trigger account securing;
    /// `Some(false)` when the best-effort call failed (already logged).
    pub account_secured: Option<bool>,
    /// Whether the document pack reached the print service. Failure does not
    /// affect the submission outcome.
    pub documents_dispatched: bool,
}

/// Orchestrates the admission-order submission against the boundary ports.
#[derive(Clone)]
pub struct OrderWorkflow {
    cfg: Arc<AdmissionConfig>,
    fua: Arc<dyn FuaAuthorizations>,
    diagnosis: Arc<dyn DiagnosisVerification>,
    records: Arc<dyn OrderRecords>,
    documents: Arc<dyn AdmissionDocuments>,
}

impl OrderWorkflow {
    pub fn new(
        cfg: Arc<AdmissionConfig>,
        fua: Arc<dyn FuaAuthorizations>,
        diagnosis: Arc<dyn DiagnosisVerification>,
        records: Arc<dyn OrderRecords>,
        documents: Arc<dyn AdmissionDocuments>,
    ) -> Self {
        Self {
            cfg,
            fua,
            diagnosis,
            records,
            documents,
        }
    }

    /// Steps 1–3. Safe to call repeatedly; nothing is cached and no state is
    /// created.
    pub async fn preflight(&self, form: &OrderForm, patient_id: &str) -> Preflight {
        let errors = validate(form);
        if !errors.is_empty() {
            return Preflight {
                errors,
                diagnosis: DiagnosisOutcome::NotChecked,
                fua: None,
            };
        }

        let diagnosis = self.verify_diagnosis(form).await;
        if matches!(diagnosis, DiagnosisOutcome::Rejected { .. }) {
            return Preflight {
                errors,
                diagnosis,
                fua: None,
            };
        }

        let insurance_code = form
            .insurance
            .as_ref()
            .map(CatalogRef::code)
            .unwrap_or_default();
        let fua = evaluate_fua_gate(&self.cfg, self.fua.as_ref(), insurance_code, patient_id).await;

        Preflight {
            errors,
            diagnosis,
            fua: Some(fua),
        }
    }

    /// Steps 1–3 re-run from the submitted form state, then steps 5–9.
    /// Called only after the user's explicit confirmation (step 4).
    pub async fn submit(
        &self,
        ctx: &SessionContext,
        req: &SubmissionRequest,
    ) -> SubmitResult<SubmissionReceipt> {
        let preflight = self.preflight(&req.form, &req.patient.id).await;

        if !preflight.errors.is_empty() {
            return Err(SubmitError::Validation(preflight.errors));
        }
        if let DiagnosisOutcome::Rejected { code } = &preflight.diagnosis {
            return Err(SubmitError::DiagnosisRejected { code: code.clone() });
        }
        let gate = preflight.fua.clone().unwrap_or(FuaGate::Missing);
        if !gate.permits(req.fua_bypass_acknowledged) {
            return Err(SubmitError::AuthorizationGap {
                patient_id: req.patient.id.clone(),
            });
        }

        let diagnosis_text = match &preflight.diagnosis {
            DiagnosisOutcome::Confirmed {
                canonical: Some(canonical),
            } => canonical.clone(),
            _ => req.form.diagnosis.trim().to_owned(),
        };

        // Step 5: allocation. Failure aborts before anything is persisted.
        let order_id = self
            .records
            .allocate_id()
            .await
            .map_err(SubmitError::Allocation)?;

        // Step 6.
        let record = derive_record(
            &req.form,
            &req.patient,
            &diagnosis_text,
            &order_id,
            Utc::now().date_naive(),
        );

        // Step 7. On failure the allocated id is abandoned; a retry starts
        // over from allocation.
        self.records
            .create(&record)
            .await
            .map_err(SubmitError::Persistence)?;

        // Step 8: best-effort, never rolls back the persisted order.
        let account_secured = if self.cfg.secures_account_for(&record.insurance_code) {
            let secure = SecureAccountRequest {
                order_id: record.id.clone(),
                patient_id: record.patient_id.clone(),
                insurance_code: record.insurance_code.clone(),
                user: ctx.user.id.clone(),
                name: ctx.user.display_name.clone(),
            };
            match self.records.secure_account(&secure).await {
                Ok(()) => Some(true),
                Err(e) => {
                    tracing::warn!(order_id = %record.id, "account securing failed: {e}");
                    Some(false)
                }
            }
        } else {
            None
        };

        // Step 9: fire-and-forget relative to the submission outcome.
        let documents_dispatched = match self
            .documents
            .dispatch_pack(&record.id, &ctx.user.display_name)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(order_id = %record.id, "document handoff failed: {e}");
                false
            }
        };

        Ok(SubmissionReceipt {
            order_id: record.id,
            diagnosis: record.diagnosis,
            account_secured,
            documents_dispatched,
        })
    }

    async fn verify_diagnosis(&self, form: &OrderForm) -> DiagnosisOutcome {
        if form.origin_type != OriginType::OutpatientConsult {
            return DiagnosisOutcome::NotChecked;
        }

        let code = form.diagnosis_code().to_owned();
        match self.diagnosis.verify(&code).await {
            Ok(verdict) if !verdict.valid => DiagnosisOutcome::Rejected { code },
            Ok(verdict) => match verdict.matches.len() {
                0 => DiagnosisOutcome::Confirmed { canonical: None },
                1 => {
                    let m = &verdict.matches[0];
                    DiagnosisOutcome::Confirmed {
                        canonical: Some(format!("{} - {}", m.code, m.description)),
                    }
                }
                _ => DiagnosisOutcome::Ambiguous {
                    matches: verdict.matches,
                },
            },
            Err(e) => {
                // Conservative: an unverifiable diagnosis must not be
                // persisted for an outpatient-consult admission.
                tracing::warn!("diagnosis verification failed for {code:?}, blocking: {e}");
                DiagnosisOutcome::Rejected { code }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ActingUser;
    use crate::error::GatewayError;
    use crate::ports::{
        DiagnosisVerdict, FuaStatus, OrderListRequest, OrderPage, OrderRecord, StoredOrder,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use hospadm_types::OrderStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubFua {
        has_fua: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FuaAuthorizations for StubFua {
        async fn check_active(&self, _patient_id: &str) -> Result<FuaStatus, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GatewayError::Transport("fua backend down".into()));
            }
            Ok(FuaStatus {
                has_fua: self.has_fua,
                fua_id: self.has_fua.then(|| "FUA-77".to_owned()),
            })
        }
    }

    struct StubDiagnosis {
        verdict: Option<DiagnosisVerdict>,
        calls: AtomicUsize,
    }

    impl StubDiagnosis {
        fn unused() -> Self {
            Self {
                verdict: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn with(valid: bool, matches: Vec<(&str, &str)>) -> Self {
            Self {
                verdict: Some(DiagnosisVerdict {
                    valid,
                    matches: matches
                        .into_iter()
                        .map(|(code, description)| DiagnosisMatch {
                            code: code.to_owned(),
                            description: description.to_owned(),
                        })
                        .collect(),
                }),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DiagnosisVerification for StubDiagnosis {
        async fn verify(&self, _code: &str) -> Result<DiagnosisVerdict, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.verdict
                .clone()
                .ok_or_else(|| GatewayError::Transport("coding service down".into()))
        }
    }

    #[derive(Default)]
    struct StubRecords {
        allocate_fail: bool,
        create_fail: bool,
        secure_fail: bool,
        allocations: AtomicUsize,
        created: Mutex<Vec<OrderRecord>>,
        secured: Mutex<Vec<SecureAccountRequest>>,
    }

    impl StubRecords {
        fn created(&self) -> Vec<OrderRecord> {
            self.created.lock().unwrap().clone()
        }

        fn secured(&self) -> Vec<SecureAccountRequest> {
            self.secured.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderRecords for StubRecords {
        async fn load(&self, order_id: &str) -> Result<StoredOrder, GatewayError> {
            let created = self.created.lock().unwrap();
            let record = created
                .iter()
                .find(|r| r.id == order_id)
                .ok_or_else(|| GatewayError::Rejected {
                    status: 404,
                    message: format!("order {order_id} not found"),
                })?;
            Ok(StoredOrder {
                id: record.id.clone(),
                patient_id: record.patient_id.clone(),
                patient_name: record.patient_name.clone(),
                status: OrderStatus::from_code(&record.status),
                date: record.date.clone(),
                time: record.time.clone(),
                origin_type: hospadm_types::OriginType::from_wire_code(&record.origin_type)
                    .unwrap(),
                origin: None,
                ward: None,
                doctor: None,
                insurance: None,
                diagnosis: record.diagnosis.clone(),
                age: record.age.clone(),
                companion_name: record.companion_name.clone(),
                companion_phone: record.companion_phone.clone(),
                companion_address: record.companion_address.clone(),
            })
        }

        async fn list_for_patient(
            &self,
            _req: &OrderListRequest,
        ) -> Result<OrderPage, GatewayError> {
            unreachable!("not exercised by workflow tests")
        }

        async fn allocate_id(&self) -> Result<String, GatewayError> {
            let n = self.allocations.fetch_add(1, Ordering::SeqCst) + 1;
            if self.allocate_fail {
                return Err(GatewayError::Rejected {
                    status: 500,
                    message: "sequence unavailable".into(),
                });
            }
            Ok(format!("{n:06}"))
        }

        async fn create(&self, record: &OrderRecord) -> Result<(), GatewayError> {
            if self.create_fail {
                return Err(GatewayError::Rejected {
                    status: 409,
                    message: "record rejected".into(),
                });
            }
            self.created.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn secure_account(&self, req: &SecureAccountRequest) -> Result<(), GatewayError> {
            self.secured.lock().unwrap().push(req.clone());
            if self.secure_fail {
                return Err(GatewayError::Transport("secure-account timeout".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubDocs {
        fail: bool,
        dispatched: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl AdmissionDocuments for StubDocs {
        async fn dispatch_pack(
            &self,
            order_id: &str,
            requested_by: &str,
        ) -> Result<(), GatewayError> {
            self.dispatched
                .lock()
                .unwrap()
                .push((order_id.to_owned(), requested_by.to_owned()));
            if self.fail {
                return Err(GatewayError::Transport("print service down".into()));
            }
            Ok(())
        }
    }

    fn workflow(
        fua: Arc<StubFua>,
        diagnosis: Arc<StubDiagnosis>,
        records: Arc<StubRecords>,
        documents: Arc<StubDocs>,
    ) -> OrderWorkflow {
        OrderWorkflow::new(
            Arc::new(AdmissionConfig::default()),
            fua,
            diagnosis,
            records,
            documents,
        )
    }

    fn ctx() -> SessionContext {
        SessionContext {
            user: ActingUser {
                id: "jlopez".into(),
                display_name: "J. Lopez".into(),
            },
            auth_token: "token-abc".into(),
        }
    }

    fn patient() -> PatientFacts {
        PatientFacts {
            id: "P-9".into(),
            full_name: "Rosa Mamani".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 10).unwrap(),
        }
    }

    fn complete_form(origin_type: OriginType, insurance_code: &str) -> OrderForm {
        let mut form = OrderForm::new(origin_type);
        form.date = "2024-05-20".into();
        form.time = "14:30".into();
        form.ward = Some(CatalogRef::new("MED01", "Medicina").unwrap());
        form.doctor = Some(CatalogRef::new("041", "Dr. Rojas").unwrap());
        form.insurance = Some(CatalogRef::new(insurance_code, "Seguro").unwrap());
        form.diagnosis = "J45".into();
        form.companion_name = "Maria Quispe".into();
        form.companion_phone = "999111222".into();
        form.companion_address = "Av. Grau 123".into();
        if origin_type.requires_origin_record() {
            form.origin = Some(CatalogRef::new("EM0042", "Emergencia").unwrap());
        }
        form
    }

    fn request(origin_type: OriginType, insurance_code: &str) -> SubmissionRequest {
        SubmissionRequest {
            form: complete_form(origin_type, insurance_code),
            patient: patient(),
            fua_bypass_acknowledged: false,
        }
    }

    #[tokio::test]
    async fn non_sis_insurance_never_invokes_the_fua_check() {
        // Even a failing FUA backend cannot block a non-SIS submission.
        let fua = Arc::new(StubFua {
            fail: true,
            ..Default::default()
        });
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            fua.clone(),
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let receipt = wf
            .submit(&ctx(), &request(OriginType::Emergency, "10"))
            .await
            .unwrap();
        assert_eq!(fua.calls.load(Ordering::SeqCst), 0);
        assert_eq!(receipt.account_secured, None);
        assert_eq!(records.created().len(), 1);
    }

    #[tokio::test]
    async fn missing_fua_blocks_until_bypass_is_acknowledged() {
        let fua = Arc::new(StubFua::default()); // has_fua: false
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            fua,
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let mut req = request(OriginType::Emergency, "21");
        let err = wf.submit(&ctx(), &req).await.unwrap_err();
        assert!(matches!(err, SubmitError::AuthorizationGap { .. }));
        assert!(records.created().is_empty());

        req.fua_bypass_acknowledged = true;
        let receipt = wf.submit(&ctx(), &req).await.unwrap();
        assert_eq!(records.created().len(), 1);
        assert_eq!(receipt.order_id, records.created()[0].id);
    }

    #[tokio::test]
    async fn active_fua_permits_without_bypass() {
        let fua = Arc::new(StubFua {
            has_fua: true,
            ..Default::default()
        });
        let wf = workflow(
            fua,
            Arc::new(StubDiagnosis::unused()),
            Arc::new(StubRecords::default()),
            Arc::new(StubDocs::default()),
        );
        assert!(wf
            .submit(&ctx(), &request(OriginType::Emergency, "21"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn diagnosis_is_not_verified_outside_outpatient_consult() {
        let diagnosis = Arc::new(StubDiagnosis::unused());
        let wf = workflow(
            Arc::new(StubFua::default()),
            diagnosis.clone(),
            Arc::new(StubRecords::default()),
            Arc::new(StubDocs::default()),
        );
        wf.submit(&ctx(), &request(OriginType::Emergency, "10"))
            .await
            .unwrap();
        assert_eq!(diagnosis.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn single_match_canonicalises_the_diagnosis() {
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::with(true, vec![("J45", "Asthma")])),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let receipt = wf
            .submit(&ctx(), &request(OriginType::OutpatientConsult, "10"))
            .await
            .unwrap();
        assert_eq!(receipt.diagnosis, "J45 - Asthma");
        assert_eq!(records.created()[0].diagnosis, "J45 - Asthma");
    }

    #[tokio::test]
    async fn ambiguous_diagnosis_proceeds_with_the_entered_text() {
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::with(
                true,
                vec![("J45.0", "Predominantly allergic asthma"), ("J45.9", "Asthma, unspecified")],
            )),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let receipt = wf
            .submit(&ctx(), &request(OriginType::OutpatientConsult, "10"))
            .await
            .unwrap();
        // Replacement only happens on exactly one match.
        assert_eq!(receipt.diagnosis, "J45");
        assert_eq!(records.created()[0].diagnosis, "J45");
    }

    #[tokio::test]
    async fn invalid_diagnosis_blocks_before_any_state_is_created() {
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::with(false, vec![])),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let err = wf
            .submit(&ctx(), &request(OriginType::OutpatientConsult, "10"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::DiagnosisRejected { .. }));
        assert_eq!(records.allocations.load(Ordering::SeqCst), 0);
        assert!(records.created().is_empty());
    }

    #[tokio::test]
    async fn unreachable_coding_service_blocks_conservatively() {
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()), // errors on call
            Arc::new(StubRecords::default()),
            Arc::new(StubDocs::default()),
        );
        let err = wf
            .submit(&ctx(), &request(OriginType::OutpatientConsult, "10"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::DiagnosisRejected { .. }));
    }

    #[tokio::test]
    async fn secure_account_failure_never_unwinds_the_persisted_order() {
        let records = Arc::new(StubRecords {
            secure_fail: true,
            ..Default::default()
        });
        let docs = Arc::new(StubDocs::default());
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            docs.clone(),
        );

        let receipt = wf
            .submit(&ctx(), &request(OriginType::Emergency, "02"))
            .await
            .unwrap();
        assert_eq!(receipt.account_secured, Some(false));
        assert_eq!(receipt.documents_dispatched, true);

        // The order is still there and loadable.
        let loaded = records.load(&receipt.order_id).await.unwrap();
        assert_eq!(loaded.id, receipt.order_id);
    }

    #[tokio::test]
    async fn secure_account_runs_with_the_acting_user() {
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let receipt = wf
            .submit(&ctx(), &request(OriginType::Emergency, "02"))
            .await
            .unwrap();
        let secured = records.secured();
        assert_eq!(secured.len(), 1);
        assert_eq!(secured[0].order_id, receipt.order_id);
        assert_eq!(secured[0].insurance_code, "02");
        assert_eq!(secured[0].user, "jlopez");
        assert_eq!(secured[0].name, "J. Lopez");
        assert_eq!(secured[0].patient_id, "P-9");
    }

    #[tokio::test]
    async fn allocation_failure_aborts_with_nothing_persisted() {
        let records = Arc::new(StubRecords {
            allocate_fail: true,
            ..Default::default()
        });
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let err = wf
            .submit(&ctx(), &request(OriginType::Emergency, "10"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Allocation(_)));
        assert!(records.created().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_abandons_the_allocated_id() {
        let records = Arc::new(StubRecords {
            create_fail: true,
            ..Default::default()
        });
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let err = wf
            .submit(&ctx(), &request(OriginType::Emergency, "10"))
            .await
            .unwrap_err();
        match err {
            SubmitError::Persistence(inner) => {
                assert_eq!(inner.user_message(), "record rejected");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(records.allocations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_after_persistence_failure_allocates_a_fresh_id() {
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let first = wf
            .submit(&ctx(), &request(OriginType::Emergency, "10"))
            .await
            .unwrap();
        let second = wf
            .submit(&ctx(), &request(OriginType::Emergency, "10"))
            .await
            .unwrap();
        assert_ne!(first.order_id, second.order_id);
    }

    #[tokio::test]
    async fn validation_failure_touches_no_port() {
        let fua = Arc::new(StubFua::default());
        let diagnosis = Arc::new(StubDiagnosis::unused());
        let records = Arc::new(StubRecords::default());
        let wf = workflow(fua.clone(), diagnosis.clone(), records.clone(), Arc::new(StubDocs::default()));

        let mut req = request(OriginType::Emergency, "10");
        req.form.companion_name.clear();
        let err = wf.submit(&ctx(), &req).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));
        assert_eq!(fua.calls.load(Ordering::SeqCst), 0);
        assert_eq!(diagnosis.calls.load(Ordering::SeqCst), 0);
        assert_eq!(records.allocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn document_handoff_failure_does_not_fail_the_submission() {
        let docs = Arc::new(StubDocs {
            fail: true,
            ..Default::default()
        });
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()),
            Arc::new(StubRecords::default()),
            docs.clone(),
        );

        let receipt = wf
            .submit(&ctx(), &request(OriginType::Emergency, "10"))
            .await
            .unwrap();
        assert!(!receipt.documents_dispatched);
        let dispatched = docs.dispatched.lock().unwrap();
        assert_eq!(dispatched[0], (receipt.order_id.clone(), "J. Lopez".into()));
    }

    #[tokio::test]
    async fn preflight_is_rederived_and_creates_no_state() {
        let records = Arc::new(StubRecords::default());
        let wf = workflow(
            Arc::new(StubFua::default()),
            Arc::new(StubDiagnosis::unused()),
            records.clone(),
            Arc::new(StubDocs::default()),
        );

        let form = complete_form(OriginType::Emergency, "21");
        let first = wf.preflight(&form, "P-9").await;
        let second = wf.preflight(&form, "P-9").await;
        assert_eq!(first, second);
        assert_eq!(first.fua, Some(FuaGate::Missing));
        assert!(!first.is_submittable(false));
        assert!(first.is_submittable(true));
        assert!(records.created().is_empty());
        assert_eq!(records.allocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn preflight_with_field_errors_skips_later_gates() {
        let fua = Arc::new(StubFua::default());
        let wf = workflow(
            fua.clone(),
            Arc::new(StubDiagnosis::unused()),
            Arc::new(StubRecords::default()),
            Arc::new(StubDocs::default()),
        );

        let form = OrderForm::default();
        let preflight = wf.preflight(&form, "P-9").await;
        assert!(!preflight.errors.is_empty());
        assert_eq!(preflight.diagnosis, DiagnosisOutcome::NotChecked);
        assert_eq!(preflight.fua, None);
        assert_eq!(fua.calls.load(Ordering::SeqCst), 0);
        assert!(!preflight.is_submittable(true));
    }
}
