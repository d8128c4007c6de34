//! FUA authorization gateway.

use crate::{authorize, into_rejected, transport, GatewayConfig};
use async_trait::async_trait;
use hospadm_core::{FuaAuthorizations, FuaStatus, GatewayError};

pub struct HttpFuaAuthorizations {
    client: reqwest::Client,
    cfg: GatewayConfig,
}

impl HttpFuaAuthorizations {
    pub fn new(client: reqwest::Client, cfg: GatewayConfig) -> Self {
        Self { client, cfg }
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuaDto {
    has_fua: bool,
    #[serde(default)]
    fua_id: Option<String>,
}

#[async_trait]
impl FuaAuthorizations for HttpFuaAuthorizations {
    async fn check_active(&self, patient_id: &str) -> Result<FuaStatus, GatewayError> {
        let resp = authorize(self.client.get(self.cfg.url("/fua/check")), &self.cfg)
            .query(&[("patientId", patient_id)])
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }

        let dto: FuaDto = resp.json().await.map_err(transport)?;
        Ok(FuaStatus {
            has_fua: dto.has_fua,
            fua_id: dto.fua_id.filter(|id| !id.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fua_dto_parses_both_outcomes() {
        let found: FuaDto =
            serde_json::from_str(r#"{"hasFua": true, "fuaId": "FUA-77"}"#).unwrap();
        assert!(found.has_fua);
        assert_eq!(found.fua_id.as_deref(), Some("FUA-77"));

        let missing: FuaDto = serde_json::from_str(r#"{"hasFua": false, "fuaId": null}"#).unwrap();
        assert!(!missing.has_fua);
        assert!(missing.fua_id.is_none());
    }
}
