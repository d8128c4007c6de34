//! Catalog search gateway.
//!
//! Malformed entries (empty code, unknown origin-type code) are dropped with
//! a warning rather than failing the whole search; an empty or shortened
//! result list is always a valid outcome for search-as-you-type.

use crate::{authorize, into_rejected, transport, GatewayConfig};
use async_trait::async_trait;
use hospadm_core::{CatalogKind, CatalogSearch, GatewayError, OriginEntry};
use hospadm_types::{CatalogRef, OriginType};

pub struct HttpCatalog {
    client: reqwest::Client,
    cfg: GatewayConfig,
}

impl HttpCatalog {
    pub fn new(client: reqwest::Client, cfg: GatewayConfig) -> Self {
        Self { client, cfg }
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OriginDto {
    code: String,
    #[serde(default)]
    label: String,
    origin_type: String,
    #[serde(default)]
    doctor_code: String,
    #[serde(default)]
    doctor_name: String,
    #[serde(default)]
    diagnosis_code: String,
    #[serde(default)]
    diagnosis_description: String,
    #[serde(default)]
    insurance_code: String,
    #[serde(default)]
    insurance_name: String,
    #[serde(default)]
    ward_code: String,
    #[serde(default)]
    ward_name: String,
}

impl OriginDto {
    fn into_entry(self) -> Option<OriginEntry> {
        let origin = CatalogRef::new(&self.code, &self.label).ok()?;
        let origin_type = OriginType::from_wire_code(&self.origin_type).ok()?;
        Some(OriginEntry {
            origin,
            origin_type,
            doctor: opt_ref(&self.doctor_code, &self.doctor_name),
            insurance: opt_ref(&self.insurance_code, &self.insurance_name),
            diagnosis_code: opt_text(&self.diagnosis_code),
            diagnosis_description: opt_text(&self.diagnosis_description),
            ward: opt_ref(&self.ward_code, &self.ward_name),
        })
    }
}

#[derive(serde::Deserialize)]
struct EntryDto {
    code: String,
    #[serde(default)]
    label: String,
}

fn opt_ref(code: &str, label: &str) -> Option<CatalogRef> {
    CatalogRef::new(code, label).ok()
}

fn opt_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

#[async_trait]
impl CatalogSearch for HttpCatalog {
    async fn search_origins(
        &self,
        query: &str,
        scope: Option<OriginType>,
    ) -> Result<Vec<OriginEntry>, GatewayError> {
        let mut params = vec![("search", query.to_owned())];
        if let Some(scope) = scope {
            params.push(("scope", scope.wire_code().to_owned()));
        }

        let resp = authorize(self.client.get(self.cfg.url("/catalog/origin")), &self.cfg)
            .query(&params)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }

        let dtos: Vec<OriginDto> = resp.json().await.map_err(transport)?;
        let total = dtos.len();
        let entries: Vec<OriginEntry> = dtos.into_iter().filter_map(OriginDto::into_entry).collect();
        if entries.len() < total {
            tracing::warn!(
                dropped = total - entries.len(),
                "dropped malformed origin catalog entries"
            );
        }
        Ok(entries)
    }

    async fn search(
        &self,
        kind: CatalogKind,
        query: &str,
    ) -> Result<Vec<CatalogRef>, GatewayError> {
        let path = format!("/catalog/{}", kind.as_str());
        let resp = authorize(self.client.get(self.cfg.url(&path)), &self.cfg)
            .query(&[("search", query)])
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }

        let dtos: Vec<EntryDto> = resp.json().await.map_err(transport)?;
        Ok(dtos
            .into_iter()
            .filter_map(|dto| CatalogRef::new(&dto.code, &dto.label).ok())
            .collect())
    }
}
