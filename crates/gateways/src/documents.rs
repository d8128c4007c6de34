//! Admission document pack gateway.
//!
//! The pack is three documents (admission order, consent, filiation sheet),
//! each generated by the external print/merge service from a URL
//! parameterized by order id and the acting user's display name. This crate
//! only hands the requests off; rendering and merging happen elsewhere.

use crate::{authorize, into_rejected, transport, GatewayConfig};
use async_trait::async_trait;
use hospadm_core::{AdmissionDocuments, GatewayError};

/// Path segments of the three documents, in print order.
const PACK_DOCUMENTS: [&str; 3] = ["admission-order", "consent", "filiation"];

pub struct HttpAdmissionDocuments {
    client: reqwest::Client,
    cfg: GatewayConfig,
}

impl HttpAdmissionDocuments {
    pub fn new(client: reqwest::Client, cfg: GatewayConfig) -> Self {
        Self { client, cfg }
    }

    /// The three document URLs for an order (without the `user` query
    /// parameter, which is attached per request).
    pub fn pack_urls(&self, order_id: &str) -> [String; 3] {
        PACK_DOCUMENTS.map(|doc| self.cfg.url(&format!("/documents/{doc}/{order_id}")))
    }
}

#[async_trait]
impl AdmissionDocuments for HttpAdmissionDocuments {
    async fn dispatch_pack(
        &self,
        order_id: &str,
        requested_by: &str,
    ) -> Result<(), GatewayError> {
        for url in self.pack_urls(order_id) {
            let resp = authorize(self.client.get(&url), &self.cfg)
                .query(&[("user", requested_by)])
                .send()
                .await
                .map_err(transport)?;
            if !resp.status().is_success() {
                return Err(into_rejected(resp).await);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_has_the_three_documents_in_print_order() {
        let docs = HttpAdmissionDocuments::new(
            reqwest::Client::new(),
            GatewayConfig::new("http://backend:8080", None),
        );
        let urls = docs.pack_urls("000123");
        assert_eq!(urls[0], "http://backend:8080/documents/admission-order/000123");
        assert_eq!(urls[1], "http://backend:8080/documents/consent/000123");
        assert_eq!(urls[2], "http://backend:8080/documents/filiation/000123");
    }
}
