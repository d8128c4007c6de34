//! Order-record backend gateway.

use crate::{authorize, into_rejected, payload, transport, GatewayConfig};
use async_trait::async_trait;
use hospadm_core::{
    GatewayError, OrderListRequest, OrderPage, OrderRecord, OrderRecords, SecureAccountRequest,
    StoredOrder,
};
use hospadm_types::{CatalogRef, OrderStatus, OriginType};

pub struct HttpOrderRecords {
    client: reqwest::Client,
    cfg: GatewayConfig,
}

impl HttpOrderRecords {
    pub fn new(client: reqwest::Client, cfg: GatewayConfig) -> Self {
        Self { client, cfg }
    }
}

/// Wire shape of a stored order: raw codes plus denormalized display names.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDto {
    id: String,
    patient_id: String,
    #[serde(default)]
    patient_name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    time: String,
    origin_type: String,
    #[serde(default)]
    origin_code: String,
    #[serde(default)]
    origin_label: String,
    #[serde(default)]
    ward_code: String,
    #[serde(default)]
    ward_name: String,
    #[serde(default)]
    doctor_code: String,
    #[serde(default)]
    doctor_name: String,
    #[serde(default)]
    insurance_code: String,
    #[serde(default)]
    insurance_name: String,
    #[serde(default)]
    diagnosis: String,
    #[serde(default)]
    age: String,
    #[serde(default)]
    companion_name: String,
    #[serde(default)]
    companion_phone: String,
    #[serde(default)]
    companion_address: String,
}

impl OrderDto {
    fn into_order(self) -> Result<StoredOrder, GatewayError> {
        let origin_type = OriginType::from_wire_code(&self.origin_type).map_err(payload)?;
        Ok(StoredOrder {
            id: self.id,
            patient_id: self.patient_id,
            patient_name: self.patient_name,
            status: OrderStatus::from_code(&self.status),
            date: self.date,
            time: self.time,
            origin_type,
            origin: opt_ref(&self.origin_code, &self.origin_label),
            ward: opt_ref(&self.ward_code, &self.ward_name),
            doctor: opt_ref(&self.doctor_code, &self.doctor_name),
            insurance: opt_ref(&self.insurance_code, &self.insurance_name),
            diagnosis: self.diagnosis,
            age: self.age,
            companion_name: self.companion_name,
            companion_phone: self.companion_phone,
            companion_address: self.companion_address,
        })
    }
}

fn opt_ref(code: &str, label: &str) -> Option<CatalogRef> {
    CatalogRef::new(code, label).ok()
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageDto {
    #[serde(default)]
    orders: Vec<OrderDto>,
    page: u32,
    page_size: u32,
    total: u64,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextIdDto {
    next_id: String,
}

#[async_trait]
impl OrderRecords for HttpOrderRecords {
    async fn load(&self, order_id: &str) -> Result<StoredOrder, GatewayError> {
        let path = format!("/order/{order_id}");
        let resp = authorize(self.client.get(self.cfg.url(&path)), &self.cfg)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }
        let dto: OrderDto = resp.json().await.map_err(transport)?;
        dto.into_order()
    }

    async fn list_for_patient(&self, req: &OrderListRequest) -> Result<OrderPage, GatewayError> {
        let resp = authorize(self.client.get(self.cfg.url("/order")), &self.cfg)
            .query(&[
                ("patientId", req.patient_id.clone()),
                ("page", req.page.to_string()),
                ("pageSize", req.page_size.to_string()),
                ("search", req.filter.clone()),
            ])
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }

        let dto: PageDto = resp.json().await.map_err(transport)?;
        let orders = dto
            .orders
            .into_iter()
            .map(OrderDto::into_order)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OrderPage {
            orders,
            page: dto.page,
            page_size: dto.page_size,
            total: dto.total,
        })
    }

    async fn allocate_id(&self) -> Result<String, GatewayError> {
        let resp = authorize(self.client.post(self.cfg.url("/order/next-id")), &self.cfg)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }

        let dto: NextIdDto = resp.json().await.map_err(transport)?;
        let next_id = dto.next_id.trim().to_owned();
        if next_id.is_empty() {
            return Err(GatewayError::Payload("allocator returned an empty id".into()));
        }
        Ok(next_id)
    }

    async fn create(&self, record: &OrderRecord) -> Result<(), GatewayError> {
        let resp = authorize(self.client.post(self.cfg.url("/order")), &self.cfg)
            .json(record)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }
        Ok(())
    }

    async fn secure_account(&self, req: &SecureAccountRequest) -> Result<(), GatewayError> {
        let path = format!("/order/{}/secure-account", req.order_id);
        let resp = authorize(self.client.post(self.cfg.url(&path)), &self.cfg)
            .json(req)
            .send()
            .await
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(into_rejected(resp).await);
        }
        Ok(())
    }
}
