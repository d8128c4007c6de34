//! Diagnosis-coding verification gateway.
//!
//! Transport and payload errors propagate as-is; the workflow treats any of
//! them as a blocking verification failure for outpatient-consult origins.

use crate::{authorize, into_rejected, transport, GatewayConfig};
use async_trait::async_trait;
use hospadm_core::{DiagnosisMatch, DiagnosisVerdict, DiagnosisVerification, GatewayError};

pub struct HttpDiagnosisVerification {
    client: reqwest::Client,
    cfg: GatewayConfig,
}

impl HttpDiagnosisVerification {
    pub fn new(client: reqwest::Client, cfg: GatewayConfig) -> Self {
        Self { client, cfg }
    }
}

#[derive(serde::Deserialize)]
struct VerifyDto {
    success: bool,
    #[serde(default)]
    matches: Vec<DiagnosisMatch>,
}

#[async_trait]
impl DiagnosisVerification for HttpDiagnosisVerification {
    async fn verify(&self, code: &str) -> Result<DiagnosisVerdict, GatewayError> {
        let resp = authorize(self.client.get(self.cfg.url("/diagnosis-verify")), &self.cfg)
            .query(&[("code", code)])
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }

        let dto: VerifyDto = resp.json().await.map_err(transport)?;
        Ok(DiagnosisVerdict {
            valid: dto.success,
            matches: dto.matches,
        })
    }
}
