use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{Document, DomainError, DomainResult, InvoiceId, ShopId, SupplierId};

/// One row of a supplier invoice: a plain snapshot, no catalog linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: i64,
    /// Unit price in minor currency units.
    pub rate: u64,
}

impl InvoiceLine {
    /// Row total in minor units. A product that does not fit in `u64` is a
    /// validation error, never a wrapped total.
    pub fn total(&self) -> DomainResult<u64> {
        let wide = (self.quantity as i128)
            .checked_mul(self.rate as i128)
            .ok_or_else(|| DomainError::validation("invoice line total overflow"))?;
        u64::try_from(wide).map_err(|_| DomainError::validation("invoice line total overflow"))
    }

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("invoice line name cannot be empty"));
        }
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(())
    }
}

/// Document: an invoice received from a supplier. Purchase paperwork only;
/// it never touches stock (restocking is recorded as a product edit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub shop_id: ShopId,
    /// Minted, human-readable (e.g. `INV-2025-0007`).
    pub number: String,
    pub supplier_id: SupplierId,
    pub invoice_date: DateTime<Utc>,
    pub items: Vec<InvoiceLine>,
    /// Sum of row totals, minor currency units.
    pub grand_total: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input: fields the caller supplies when recording an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub supplier_id: SupplierId,
    pub invoice_date: DateTime<Utc>,
    pub items: Vec<InvoiceLine>,
}

/// Input: partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePatch {
    pub supplier_id: Option<SupplierId>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub items: Option<Vec<InvoiceLine>>,
}

fn validate_items(items: &[InvoiceLine]) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::validation("invoice must contain at least one line"));
    }
    for item in items {
        item.validate()?;
    }
    Ok(())
}

/// Checked sum of row totals.
fn sum_totals(items: &[InvoiceLine]) -> DomainResult<u64> {
    let mut total: u64 = 0;
    for item in items {
        total = total
            .checked_add(item.total()?)
            .ok_or_else(|| DomainError::validation("invoice grand total overflow"))?;
    }
    Ok(total)
}

impl Invoice {
    /// Validate and build. Whether the supplier actually exists is checked by
    /// the storage layer inside the creating transaction.
    pub fn create(
        shop_id: ShopId,
        id: InvoiceId,
        number: String,
        input: NewInvoice,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_items(&input.items)?;
        let grand_total = sum_totals(&input.items)?;

        Ok(Self {
            id,
            shop_id,
            number,
            supplier_id: input.supplier_id,
            invoice_date: input.invoice_date,
            items: input.items,
            grand_total,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: InvoicePatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(supplier_id) = patch.supplier_id {
            self.supplier_id = supplier_id;
        }
        if let Some(invoice_date) = patch.invoice_date {
            self.invoice_date = invoice_date;
        }
        if let Some(items) = patch.items {
            validate_items(&items)?;
            self.grand_total = sum_totals(&items)?;
            self.items = items;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Document for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}
