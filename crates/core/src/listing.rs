//! Order list presentation logic.
//!
//! Pagination state plus per-row action gating. The list offers edit/delete
//! only for the editable-class statuses; printing is always offered. A user
//! who reaches a locked order anyway (e.g. direct navigation) gets the
//! loader's read-only notice instead of an edit form.

use crate::error::GatewayError;
use crate::ports::{OrderListRequest, OrderRecords, StoredOrder};
use std::sync::Arc;

/// Client-side pagination/filter state for one patient's order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListState {
    patient_id: String,
    page: u32,
    page_size: u32,
    filter: String,
}

impl OrderListState {
    pub fn new(patient_id: impl Into<String>, page_size: u32) -> Self {
        Self {
            patient_id: patient_id.into(),
            page: 1,
            page_size: page_size.max(1),
            filter: String::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Change the active filter text. Any change resets the page to 1.
    pub fn set_filter(&mut self, filter: &str) {
        if self.filter != filter {
            self.filter = filter.to_owned();
            self.page = 1;
        }
    }

    pub fn to_request(&self) -> OrderListRequest {
        OrderListRequest {
            patient_id: self.patient_id.clone(),
            page: self.page,
            page_size: self.page_size,
            filter: self.filter.clone(),
        }
    }
}

/// One row of the order list with its action availability resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub order: StoredOrder,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_print: bool,
}

impl OrderRow {
    pub fn new(order: StoredOrder) -> Self {
        let editable_class = order.status.offers_edit_actions();
        Self {
            can_edit: editable_class,
            can_delete: editable_class,
            can_print: true,
            order,
        }
    }
}

/// A resolved page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderListPage {
    pub rows: Vec<OrderRow>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// Loads paginated order rows for a patient.
#[derive(Clone)]
pub struct OrderListing {
    records: Arc<dyn OrderRecords>,
}

impl OrderListing {
    pub fn new(records: Arc<dyn OrderRecords>) -> Self {
        Self { records }
    }

    pub async fn load(&self, state: &OrderListState) -> Result<OrderListPage, GatewayError> {
        let page = self.records.list_for_patient(&state.to_request()).await?;
        Ok(OrderListPage {
            rows: page.orders.into_iter().map(OrderRow::new).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        })
    }
}
