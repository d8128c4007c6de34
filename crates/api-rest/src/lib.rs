//! # API REST
//!
//! REST facade over the admission-order workflow core.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON DTOs, CORS, status mapping)
//!
//! The router lives here so the workspace's `hospadm-run` binary and the
//! standalone `hospadm-api-rest` binary serve the same application.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::{
    ErrorRes, HealthRes, OrderListDto, OrderSnapshotDto, PreflightDto, PreflightReq,
    SubmitOrderReq, SubmitOrderRes,
};
use hospadm_core::{
    constants::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE_MS},
    ActingUser, AdmissionConfig, CatalogKind, CatalogSearch, GatewayError, OrderListState,
    OrderListing, OrderLoader, OrderWorkflow, SessionContext, SubmitError, SubmissionRequest,
};
use hospadm_gateways::{
    build_client, GatewayConfig, HttpAdmissionDocuments, HttpCatalog, HttpDiagnosisVerification,
    HttpFuaAuthorizations, HttpOrderRecords,
};
use hospadm_types::OriginType;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    workflow: Arc<OrderWorkflow>,
    loader: OrderLoader,
    listing: OrderListing,
    catalog: Arc<dyn CatalogSearch>,
}

impl AppState {
    /// Wire the state from explicit ports; used directly by tests.
    pub fn from_ports(
        cfg: Arc<AdmissionConfig>,
        catalog: Arc<dyn CatalogSearch>,
        fua: Arc<dyn hospadm_core::FuaAuthorizations>,
        diagnosis: Arc<dyn hospadm_core::DiagnosisVerification>,
        records: Arc<dyn hospadm_core::OrderRecords>,
        documents: Arc<dyn hospadm_core::AdmissionDocuments>,
    ) -> Self {
        Self {
            workflow: Arc::new(OrderWorkflow::new(
                cfg,
                fua,
                diagnosis,
                records.clone(),
                documents,
            )),
            loader: OrderLoader::new(records.clone()),
            listing: OrderListing::new(records),
            catalog,
        }
    }

    /// Wire the state against the HTTP gateways.
    pub fn from_gateways(
        cfg: Arc<AdmissionConfig>,
        client: reqwest::Client,
        gateway_cfg: GatewayConfig,
    ) -> Self {
        Self::from_ports(
            cfg,
            Arc::new(HttpCatalog::new(client.clone(), gateway_cfg.clone())),
            Arc::new(HttpFuaAuthorizations::new(
                client.clone(),
                gateway_cfg.clone(),
            )),
            Arc::new(HttpDiagnosisVerification::new(
                client.clone(),
                gateway_cfg.clone(),
            )),
            Arc::new(HttpOrderRecords::new(client.clone(), gateway_cfg.clone())),
            Arc::new(HttpAdmissionDocuments::new(client, gateway_cfg)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        search_origins,
        search_catalog,
        get_order,
        list_orders,
        preflight_order,
        submit_order,
    ),
    components(schemas(
        dto::HealthRes,
        dto::CatalogRefDto,
        dto::OriginEntryDto,
        dto::OrderDto,
        dto::OrderDisplayDto,
        dto::OrderSnapshotDto,
        dto::OrderRowDto,
        dto::OrderListDto,
        dto::OrderFormDto,
        dto::PatientDto,
        dto::ActingUserDto,
        dto::PreflightReq,
        dto::DiagnosisMatchDto,
        dto::PreflightDto,
        dto::SubmitOrderReq,
        dto::SubmitOrderRes,
        dto::ErrorRes,
    ))
)]
struct ApiDoc;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog/origin", get(search_origins))
        .route("/catalog/:kind", get(search_catalog))
        .route("/orders/:id", get(get_order))
        .route("/patients/:patient_id/orders", get(list_orders))
        .route("/orders/preflight", post(preflight_order))
        .route("/orders", post(submit_order))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Resolve configuration from the environment and serve the REST API.
///
/// # Environment Variables
/// - `HOSPADM_REST_ADDR`: bind address (default "0.0.0.0:3000")
/// - `HOSPADM_BACKEND_URL`: order/catalog backend base URL (default "http://localhost:8080")
/// - `HOSPADM_BACKEND_TOKEN`: bearer token for the backend (optional)
/// - `HOSPADM_HTTP_TIMEOUT_MS`: per-request timeout (default 10000)
/// - `HOSPADM_FUA_CODES`: comma-separated SIS insurance codes (defaults documented in core)
/// - `HOSPADM_SECURED_CODES`: comma-separated account-securing codes
/// - `HOSPADM_SEARCH_DEBOUNCE_MS`: catalog search debounce window
pub async fn serve_from_env() -> anyhow::Result<()> {
    let addr = std::env::var("HOSPADM_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let state = state_from_env()?;

    tracing::info!("-- Starting hospadm REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Build [`AppState`] from environment variables.
pub fn state_from_env() -> anyhow::Result<AppState> {
    let cfg = Arc::new(admission_config_from_env()?);

    let backend_url =
        std::env::var("HOSPADM_BACKEND_URL").unwrap_or_else(|_| "http://localhost:8080".into());
    let token = std::env::var("HOSPADM_BACKEND_TOKEN").ok().filter(|t| !t.is_empty());
    let timeout_ms: u64 = match std::env::var("HOSPADM_HTTP_TIMEOUT_MS") {
        Ok(raw) => raw.parse()?,
        Err(_) => 10_000,
    };

    let client = build_client(Duration::from_millis(timeout_ms))
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;
    let gateway_cfg = GatewayConfig::new(&backend_url, token);

    Ok(AppState::from_gateways(cfg, client, gateway_cfg))
}

/// Parse the admission configuration from the environment, falling back to
/// the documented defaults for anything unset.
pub fn admission_config_from_env() -> anyhow::Result<AdmissionConfig> {
    let fua_codes = csv_env("HOSPADM_FUA_CODES").unwrap_or_else(|| {
        hospadm_core::constants::DEFAULT_FUA_INSURANCE_CODES
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    });
    let secured_codes = csv_env("HOSPADM_SECURED_CODES").unwrap_or_else(|| {
        hospadm_core::constants::DEFAULT_SECURED_INSURANCE_CODES
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    });
    let debounce_ms: u64 = match std::env::var("HOSPADM_SEARCH_DEBOUNCE_MS") {
        Ok(raw) => raw.parse()?,
        Err(_) => DEFAULT_SEARCH_DEBOUNCE_MS,
    };

    Ok(AdmissionConfig::new(
        fua_codes,
        secured_codes,
        Duration::from_millis(debounce_ms),
    )?)
}

fn csv_env(name: &str) -> Option<Vec<String>> {
    let raw = std::env::var(name).ok()?;
    let values: Vec<String> = raw
        .split(',')
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

fn gateway_failure(e: GatewayError) -> ApiError {
    let status = match &e {
        GatewayError::Rejected { status: 404, .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ErrorRes::message(e.user_message())))
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorRes::message(message)))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "hospadm REST API is alive".into(),
    })
}

#[derive(serde::Deserialize)]
struct OriginSearchParams {
    #[serde(default)]
    search: String,
    scope: Option<String>,
}

#[utoipa::path(
    get,
    path = "/catalog/origin",
    params(
        ("search" = Option<String>, Query, description = "Partial text to match"),
        ("scope" = Option<String>, Query, description = "Origin-type code (EM/CE/RN)")
    ),
    responses(
        (status = 200, description = "Matching origin records", body = [dto::OriginEntryDto]),
        (status = 400, description = "Unknown scope code", body = ErrorRes),
        (status = 502, description = "Catalog backend failure", body = ErrorRes)
    )
)]
/// Search origin records (prior emergency visits / outpatient consultations).
///
/// An empty result list is a normal outcome, not an error.
#[axum::debug_handler]
async fn search_origins(
    State(state): State<AppState>,
    Query(params): Query<OriginSearchParams>,
) -> Result<Json<Vec<dto::OriginEntryDto>>, ApiError> {
    let scope = match params.scope.as_deref().filter(|s| !s.is_empty()) {
        Some(code) => Some(
            OriginType::from_wire_code(code).map_err(|e| bad_request(e.to_string()))?,
        ),
        None => None,
    };

    let entries = state
        .catalog
        .search_origins(&params.search, scope)
        .await
        .map_err(gateway_failure)?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[derive(serde::Deserialize)]
struct SearchParams {
    #[serde(default)]
    search: String,
}

#[utoipa::path(
    get,
    path = "/catalog/{kind}",
    params(
        ("kind" = String, Path, description = "ward | doctor | insurance | diagnosis"),
        ("search" = Option<String>, Query, description = "Partial text to match")
    ),
    responses(
        (status = 200, description = "Matching catalog entries", body = [dto::CatalogRefDto]),
        (status = 400, description = "Unknown catalog kind", body = ErrorRes),
        (status = 502, description = "Catalog backend failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn search_catalog(
    State(state): State<AppState>,
    AxumPath(kind): AxumPath<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<dto::CatalogRefDto>>, ApiError> {
    let kind: CatalogKind = kind.parse().map_err(bad_request)?;
    let entries = state
        .catalog
        .search(kind, &params.search)
        .await
        .map_err(gateway_failure)?;
    Ok(Json(
        entries.iter().map(dto::CatalogRefDto::from_ref).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order snapshot with derived editability", body = OrderSnapshotDto),
        (status = 404, description = "Order not found", body = ErrorRes),
        (status = 502, description = "Order backend failure", body = ErrorRes)
    )
)]
/// Load an order and derive its editability from the status code.
#[axum::debug_handler]
async fn get_order(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<OrderSnapshotDto>, ApiError> {
    let snapshot = state.loader.load(&id).await.map_err(gateway_failure)?;
    Ok(Json(snapshot.into()))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    page: Option<u32>,
    page_size: Option<u32>,
    #[serde(default)]
    search: String,
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}/orders",
    params(
        ("patient_id" = String, Path, description = "Patient id"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("pageSize" = Option<u32>, Query, description = "Rows per page"),
        ("search" = Option<String>, Query, description = "Filter text; changing it resets to page 1")
    ),
    responses(
        (status = 200, description = "One page of the patient's orders", body = OrderListDto),
        (status = 502, description = "Order backend failure", body = ErrorRes)
    )
)]
/// Paginated order list with status-gated action availability per row.
#[axum::debug_handler]
async fn list_orders(
    State(state): State<AppState>,
    AxumPath(patient_id): AxumPath<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<OrderListDto>, ApiError> {
    let mut list_state =
        OrderListState::new(patient_id, params.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    // Filter first: a filter change resets the page, an explicit page
    // request afterwards still wins.
    list_state.set_filter(&params.search);
    if let Some(page) = params.page {
        list_state.set_page(page);
    }

    let page = state
        .listing
        .load(&list_state)
        .await
        .map_err(gateway_failure)?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/orders/preflight",
    request_body = PreflightReq,
    responses(
        (status = 200, description = "Validation, diagnosis and FUA gate state", body = PreflightDto),
        (status = 400, description = "Malformed form payload", body = ErrorRes)
    )
)]
/// Run the pre-submission gates (validation, diagnosis re-verification, FUA)
/// for the confirmation dialog. Re-derived from the submitted form state on
/// every call; never cached.
#[axum::debug_handler]
async fn preflight_order(
    State(state): State<AppState>,
    Json(req): Json<PreflightReq>,
) -> Result<Json<PreflightDto>, ApiError> {
    let form = req.form.into_form().map_err(bad_request)?;
    let preflight = state.workflow.preflight(&form, req.patient_id.trim()).await;
    Ok(Json(preflight.into()))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = SubmitOrderReq,
    responses(
        (status = 201, description = "Order created", body = SubmitOrderRes),
        (status = 400, description = "Malformed payload", body = ErrorRes),
        (status = 409, description = "Missing FUA authorization without bypass", body = ErrorRes),
        (status = 422, description = "Validation or diagnosis verification failure", body = ErrorRes),
        (status = 502, description = "Allocation or persistence failure", body = ErrorRes)
    )
)]
/// Submit a confirmed admission order.
#[axum::debug_handler]
async fn submit_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitOrderReq>,
) -> Result<(StatusCode, Json<SubmitOrderRes>), ApiError> {
    let form = req.form.into_form().map_err(bad_request)?;
    let patient = req.patient.into_facts().map_err(bad_request)?;

    let ctx = SessionContext {
        user: ActingUser {
            id: req.user.id.trim().to_owned(),
            display_name: req.user.display_name.trim().to_owned(),
        },
        auth_token: bearer_token(&headers).unwrap_or_default(),
    };

    let submission = SubmissionRequest {
        form,
        patient,
        fua_bypass_acknowledged: req.fua_bypass_acknowledged,
    };

    match state.workflow.submit(&ctx, &submission).await {
        Ok(receipt) => Ok((StatusCode::CREATED, Json(receipt.into()))),
        Err(e) => {
            tracing::error!("Order submission error: {:?}", e);
            Err(submit_failure(e))
        }
    }
}

fn submit_failure(e: SubmitError) -> ApiError {
    match e {
        SubmitError::Validation(errors) => {
            let errors: BTreeMap<String, String> = errors
                .iter()
                .map(|(field, message)| (field.as_str().to_owned(), message.clone()))
                .collect();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorRes {
                    message: "form validation failed".into(),
                    errors: Some(errors),
                }),
            )
        }
        SubmitError::DiagnosisRejected { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorRes::message(e.to_string())),
        ),
        SubmitError::AuthorizationGap { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorRes::message(e.to_string())),
        ),
        SubmitError::Allocation(inner) | SubmitError::Persistence(inner) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorRes::message(inner.user_message())),
        ),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_owned())
}
