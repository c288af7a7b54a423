use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{BillId, Document, DomainError, DomainResult, KitId, ProductId, ShopId, UserId};

/// One row of a bill: a tagged union dispatched on `itemType`.
///
/// `Simple` rows are free text with no inventory linkage; `Product` and `Kit`
/// rows must resolve against the catalog when the bill is created. Rows are
/// snapshots: the name and rate are whatever was billed, and later catalog
/// edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "itemType")]
pub enum LineItem {
    Simple {
        name: String,
        quantity: i64,
        rate: u64,
    },
    Product {
        #[serde(rename = "itemId")]
        product_id: ProductId,
        name: String,
        quantity: i64,
        rate: u64,
    },
    Kit {
        #[serde(rename = "itemId")]
        kit_id: KitId,
        name: String,
        quantity: i64,
        rate: u64,
    },
}

impl LineItem {
    pub fn name(&self) -> &str {
        match self {
            LineItem::Simple { name, .. }
            | LineItem::Product { name, .. }
            | LineItem::Kit { name, .. } => name,
        }
    }

    pub fn quantity(&self) -> i64 {
        match self {
            LineItem::Simple { quantity, .. }
            | LineItem::Product { quantity, .. }
            | LineItem::Kit { quantity, .. } => *quantity,
        }
    }

    /// Rate in minor currency units. Non-negative by construction.
    pub fn rate(&self) -> u64 {
        match self {
            LineItem::Simple { rate, .. }
            | LineItem::Product { rate, .. }
            | LineItem::Kit { rate, .. } => *rate,
        }
    }

    /// Row total in minor units. A product that does not fit in `u64` is a
    /// validation error, never a wrapped total.
    pub fn total(&self) -> DomainResult<u64> {
        let wide = (self.quantity() as i128)
            .checked_mul(self.rate() as i128)
            .ok_or_else(|| DomainError::validation("line item total overflow"))?;
        u64::try_from(wide).map_err(|_| DomainError::validation("line item total overflow"))
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name().trim().is_empty() {
            return Err(DomainError::validation("line item name cannot be empty"));
        }
        if self.quantity() <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(())
    }
}

/// Derived payment state of a bill; never stored, always computed from
/// `paid_amount` vs `grand_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

/// Input: a proposed bill, validated before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBill {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub bill_date: DateTime<Utc>,
    pub items: Vec<LineItem>,
}

impl NewBill {
    /// Fail-fast input validation (spec: before touching storage).
    pub fn validate(&self) -> DomainResult<()> {
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        if self.items.is_empty() {
            return Err(DomainError::validation("bill must contain at least one line item"));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

/// Checked sum of row totals.
fn sum_totals(items: &[LineItem]) -> DomainResult<u64> {
    let mut total: u64 = 0;
    for item in items {
        total = total
            .checked_add(item.total()?)
            .ok_or_else(|| DomainError::validation("bill grand total overflow"))?;
    }
    Ok(total)
}

/// Document: an issued bill. Created atomically with its inventory
/// deductions; the row snapshots in `items` are the export contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub shop_id: ShopId,
    /// Minted, human-readable (e.g. `BILL-2025-0042`).
    pub bill_number: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub bill_date: DateTime<Utc>,
    pub items: Vec<LineItem>,
    /// Sum of row totals, minor currency units.
    pub grand_total: u64,
    /// Amount received so far; never exceeds `grand_total`.
    pub paid_amount: u64,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Build the bill document from a validated draft. Re-runs validation so
    /// an unvalidated draft can never slip through.
    pub fn issue(
        shop_id: ShopId,
        id: BillId,
        bill_number: String,
        draft: NewBill,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;
        let grand_total = sum_totals(&draft.items)?;

        Ok(Self {
            id,
            shop_id,
            bill_number,
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            bill_date: draft.bill_date,
            items: draft.items,
            grand_total,
            paid_amount: 0,
            created_by,
            created_at: now,
        })
    }

    /// Replace customer info and rows from a validated draft, keeping the
    /// bill number and creation metadata. Totals are recomputed; paid amount
    /// is re-capped against the new total.
    pub fn revise(&mut self, draft: NewBill) -> DomainResult<()> {
        draft.validate()?;
        let grand_total = sum_totals(&draft.items)?;
        self.customer_name = draft.customer_name;
        self.customer_phone = draft.customer_phone;
        self.bill_date = draft.bill_date;
        self.grand_total = grand_total;
        self.items = draft.items;
        self.paid_amount = self.paid_amount.min(self.grand_total);
        Ok(())
    }

    pub fn payment_status(&self) -> PaymentStatus {
        if self.paid_amount >= self.grand_total {
            PaymentStatus::Paid
        } else if self.paid_amount == 0 {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Partial
        }
    }

    pub fn outstanding_amount(&self) -> u64 {
        self.grand_total.saturating_sub(self.paid_amount)
    }

    /// Record a received payment. The paid amount is capped at the grand
    /// total; paying an already-settled bill is a conflict.
    pub fn record_payment(&mut self, amount: u64) -> DomainResult<()> {
        if amount == 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if self.payment_status() == PaymentStatus::Paid {
            return Err(DomainError::conflict("bill is already fully paid"));
        }
        self.paid_amount = self.paid_amount.saturating_add(amount).min(self.grand_total);
        Ok(())
    }
}

impl Document for Bill {
    type Id = BillId;

    fn id(&self) -> BillId {
        self.id
    }
}
