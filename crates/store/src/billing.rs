//! Bill lifecycle transactions (the write path the whole system exists for).
//!
//! ## Bill creation flow
//!
//! ```text
//! NewBill
//!   ↓
//! 1. Validate the draft (fail fast, nothing written)
//!   ↓
//! 2. Deduct stock row by row inside one transaction
//!      Simple  → no stock effect
//!      Product → look up, deduct the requested quantity
//!      Kit     → look up, deduct per_kit_qty × quantity per component
//!   ↓
//! 3. Mint the bill number (year-bucketed sequence)
//!   ↓
//! 4. Persist the bill document
//! ```
//!
//! Every step runs against staged writes under a single write lock: a failure
//! at any row aborts the whole transaction, so stock, the counter, and the
//! bill either all change or none do. Rows targeting the same product see the
//! deductions of earlier rows (a 10-unit shelf cannot sell 6 + 6).
//!
//! Deleting or editing a bill is the inverse: rows are restocked using the
//! kit recipes as they exist at that moment. Products or kits that have been
//! removed from the catalog since billing are skipped, not resurrected.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use shopledger_billing::{Bill, LineItem, NewBill};
use shopledger_core::{BillId, DomainError, ProductId, ShopId, UserId};

use crate::error::OperationError;
use crate::memory::MemoryStore;
use crate::sequence::{SequenceKind, format_number};
use crate::tx::Tx;

/// Executes bill transactions against the store.
#[derive(Debug, Clone)]
pub struct BillingService {
    store: Arc<MemoryStore>,
}

impl BillingService {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Create a bill atomically: deduct stock for every row, mint the bill
    /// number, persist the document. All-or-nothing.
    pub fn create_bill(
        &self,
        shop_id: ShopId,
        created_by: UserId,
        draft: NewBill,
    ) -> Result<Bill, OperationError> {
        draft.validate()?;
        let now = Utc::now();

        let bill = self.store.transaction(shop_id, |tx| {
            deduct_items(tx, &draft.items, now)?;

            let year = draft.bill_date.year();
            let seq = tx.next_sequence(SequenceKind::Bill, Some(year));
            let number = format_number(SequenceKind::Bill, Some(year), seq);

            let bill = Bill::issue(shop_id, BillId::new(), number, draft, created_by, now)?;
            tx.put_bill(bill.clone());
            Ok::<_, OperationError>(bill)
        })?;

        tracing::info!(
            shop = %shop_id,
            bill = %bill.bill_number,
            total = bill.grand_total,
            "bill created"
        );
        Ok(bill)
    }

    /// Replace a bill's rows and customer info, adjusting stock in the same
    /// transaction: old rows are restocked, new rows re-deducted. The bill
    /// keeps its number and creation metadata.
    pub fn update_bill(
        &self,
        shop_id: ShopId,
        bill_id: BillId,
        draft: NewBill,
    ) -> Result<Bill, OperationError> {
        draft.validate()?;
        let now = Utc::now();

        let bill = self.store.transaction(shop_id, |tx| {
            let mut bill = tx
                .bill(bill_id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("bill {bill_id}")))?;

            restock_items(tx, &bill.items, now)?;
            deduct_items(tx, &draft.items, now)?;

            bill.revise(draft)?;
            tx.put_bill(bill.clone());
            Ok::<_, OperationError>(bill)
        })?;

        tracing::info!(shop = %shop_id, bill = %bill.bill_number, "bill revised");
        Ok(bill)
    }

    /// Delete a bill and return its stock to the shelves, atomically.
    pub fn delete_bill(&self, shop_id: ShopId, bill_id: BillId) -> Result<Bill, OperationError> {
        let now = Utc::now();

        let bill = self.store.transaction(shop_id, |tx| {
            let bill = tx
                .bill(bill_id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("bill {bill_id}")))?;

            restock_items(tx, &bill.items, now)?;
            tx.remove_bill(bill_id);
            Ok::<_, OperationError>(bill)
        })?;

        tracing::info!(shop = %shop_id, bill = %bill.bill_number, "bill deleted, stock restored");
        Ok(bill)
    }

    /// Record a received payment against a bill.
    pub fn record_payment(
        &self,
        shop_id: ShopId,
        bill_id: BillId,
        amount: u64,
    ) -> Result<Bill, OperationError> {
        self.store.transaction(shop_id, |tx| {
            let mut bill = tx
                .bill(bill_id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("bill {bill_id}")))?;

            bill.record_payment(amount)?;
            tx.put_bill(bill.clone());
            Ok(bill)
        })
    }
}

/// Deduct stock for every row, in order. Later rows see earlier deductions.
fn deduct_items(
    tx: &mut Tx<'_>,
    items: &[LineItem],
    now: DateTime<Utc>,
) -> Result<(), OperationError> {
    for item in items {
        match item {
            LineItem::Simple { .. } => {}
            LineItem::Product {
                product_id,
                quantity,
                ..
            } => {
                deduct_product(tx, *product_id, *quantity, now)?;
            }
            LineItem::Kit {
                kit_id, quantity, ..
            } => {
                let kit = tx
                    .kit(*kit_id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found(format!("kit {kit_id}")))?;
                for (product_id, units) in kit.deductions(*quantity)? {
                    deduct_product(tx, product_id, units, now)?;
                }
            }
        }
    }
    Ok(())
}

fn deduct_product(
    tx: &mut Tx<'_>,
    id: ProductId,
    units: i64,
    now: DateTime<Utc>,
) -> Result<(), OperationError> {
    let mut product = tx
        .product(id)
        .cloned()
        .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
    product.deduct(units)?;
    product.updated_at = now;
    tx.put_product(product);
    Ok(())
}

/// Return the stock a bill's rows deducted. Rows whose product or kit no
/// longer exists are skipped: a vanished kit's recipe is unknown, and a
/// vanished product is not resurrected.
fn restock_items(
    tx: &mut Tx<'_>,
    items: &[LineItem],
    now: DateTime<Utc>,
) -> Result<(), OperationError> {
    for item in items {
        match item {
            LineItem::Simple { .. } => {}
            LineItem::Product {
                product_id,
                quantity,
                ..
            } => {
                restock_product(tx, *product_id, *quantity, now)?;
            }
            LineItem::Kit {
                kit_id, quantity, ..
            } => {
                let Some(kit) = tx.kit(*kit_id).cloned() else {
                    continue;
                };
                for (product_id, units) in kit.deductions(*quantity)? {
                    restock_product(tx, product_id, units, now)?;
                }
            }
        }
    }
    Ok(())
}

fn restock_product(
    tx: &mut Tx<'_>,
    id: ProductId,
    units: i64,
    now: DateTime<Utc>,
) -> Result<(), OperationError> {
    let Some(mut product) = tx.product(id).cloned() else {
        return Ok(());
    };
    product.restock(units)?;
    product.updated_at = now;
    tx.put_product(product);
    Ok(())
}
