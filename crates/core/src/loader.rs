//! Order data loader.
//!
//! Fetches a persisted order and derives its editability purely from the
//! status code. Unknown status codes never grant edit rights.

use crate::error::GatewayError;
use crate::ports::{OrderRecords, StoredOrder};
use hospadm_types::{CatalogRef, OrderStatus};
use std::sync::Arc;

/// Read-only `"<code> [<label>]"` composites for the order view.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OrderDisplay {
    pub origin: String,
    pub ward: String,
    pub doctor: String,
    pub insurance: String,
    pub diagnosis: String,
}

/// A loaded order plus everything the caller needs to render it safely.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSnapshot {
    pub order: StoredOrder,
    pub is_editable: bool,
    pub is_locked: bool,
    /// Non-blocking notice explaining why the order is read-only, when it is.
    pub lock_notice: Option<String>,
    pub display: OrderDisplay,
}

impl OrderSnapshot {
    /// Derive editability and display composites from a stored order.
    pub fn from_order(order: StoredOrder) -> Self {
        let is_editable = order.status.is_editable();
        let lock_notice = match &order.status {
            OrderStatus::Open => None,
            OrderStatus::Locked => {
                Some("This order is finalized and can no longer be edited.".to_owned())
            }
            OrderStatus::Other(code) => {
                Some(format!("This order is read-only (status {code:?})."))
            }
        };

        let display = OrderDisplay {
            origin: composite(&order.origin),
            ward: composite(&order.ward),
            doctor: composite(&order.doctor),
            insurance: composite(&order.insurance),
            diagnosis: order.diagnosis.clone(),
        };

        Self {
            is_editable,
            is_locked: !is_editable,
            lock_notice,
            display,
            order,
        }
    }
}

fn composite(field: &Option<CatalogRef>) -> String {
    field
        .as_ref()
        .map(CatalogRef::display_composite)
        .unwrap_or_default()
}

/// Loads order snapshots from the order-record backend.
#[derive(Clone)]
pub struct OrderLoader {
    records: Arc<dyn OrderRecords>,
}

impl OrderLoader {
    pub fn new(records: Arc<dyn OrderRecords>) -> Self {
        Self { records }
    }

    pub async fn load(&self, order_id: &str) -> Result<OrderSnapshot, GatewayError> {
        let order = self.records.load(order_id).await?;
        Ok(OrderSnapshot::from_order(order))
    }
}
