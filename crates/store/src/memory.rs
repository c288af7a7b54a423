//! In-memory transactional document store.
//!
//! ## Concurrency model
//!
//! One `RwLock` guards all collections of all shops. Reads clone documents
//! out under the read lock; transactions hold the write lock from first read
//! to commit, so conflicting writers are serialized and every transaction
//! sees a settled snapshot. Staged writes apply under the same lock
//! acquisition that read them, which is what makes a bill's
//! check-then-decrement safe without per-document versioning.
//!
//! Lock poisoning is surfaced as [`StoreError::Poisoned`] instead of a
//! panic, so one crashed writer cannot take the API down with it.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard};

use shopledger_auth::User;
use shopledger_billing::{Bill, Due};
use shopledger_catalog::{Kit, Product};
use shopledger_core::{
    BillId, Document, DueId, InvoiceId, KitId, ProductId, ShopId, SupplierId, UserId,
};
use shopledger_invoicing::Invoice;
use shopledger_parties::Supplier;
use shopledger_shop::ShopProfile;

use crate::error::StoreError;
use crate::sequence::SequenceKind;
use crate::tx::Tx;

/// Committed state: every collection, keyed by (shop, id).
#[derive(Debug, Default)]
pub(crate) struct Inner {
    pub(crate) products: HashMap<(ShopId, ProductId), Product>,
    pub(crate) kits: HashMap<(ShopId, KitId), Kit>,
    pub(crate) suppliers: HashMap<(ShopId, SupplierId), Supplier>,
    pub(crate) invoices: HashMap<(ShopId, InvoiceId), Invoice>,
    pub(crate) bills: HashMap<(ShopId, BillId), Bill>,
    pub(crate) dues: HashMap<(ShopId, DueId), Due>,
    pub(crate) users: HashMap<(ShopId, UserId), User>,
    pub(crate) profiles: HashMap<ShopId, ShopProfile>,
    pub(crate) counters: HashMap<(ShopId, SequenceKind, Option<i32>), u64>,
}

/// The process-wide document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

macro_rules! collection_reads {
    ($field:ident, $doc:ty, $id:ty, $get:ident, $list:ident) => {
        pub fn $get(&self, shop_id: ShopId, id: $id) -> Result<Option<$doc>, StoreError> {
            Ok(self.read()?.$field.get(&(shop_id, id)).cloned())
        }

        /// List the shop's documents in creation order (UUIDv7 ids are
        /// time-ordered).
        pub fn $list(&self, shop_id: ShopId) -> Result<Vec<$doc>, StoreError> {
            let inner = self.read()?;
            let mut docs: Vec<$doc> = inner
                .$field
                .iter()
                .filter(|((shop, _), _)| *shop == shop_id)
                .map(|(_, doc)| doc.clone())
                .collect();
            docs.sort_by_key(|doc| doc.id());
            Ok(docs)
        }
    };
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    /// Run `f` as one atomic, shop-scoped transaction.
    ///
    /// The closure stages reads and writes through [`Tx`]; on `Ok` the staged
    /// writes are applied in one step, on `Err` they are discarded. Either
    /// way the write lock is held for the whole of `f`, so transactions are
    /// serialized against each other and against nothing else.
    pub fn transaction<T, E>(
        &self,
        shop_id: ShopId,
        f: impl FnOnce(&mut Tx<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let mut tx = Tx::new(&guard, shop_id);

        match f(&mut tx) {
            Ok(value) => {
                let staged = tx.into_staged();
                let (puts, deletes) = staged.apply(&mut guard);
                tracing::debug!(shop = %shop_id, puts, deletes, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(shop = %shop_id, "transaction aborted");
                Err(err)
            }
        }
    }

    collection_reads!(products, Product, ProductId, get_product, list_products);
    collection_reads!(kits, Kit, KitId, get_kit, list_kits);
    collection_reads!(suppliers, Supplier, SupplierId, get_supplier, list_suppliers);
    collection_reads!(invoices, Invoice, InvoiceId, get_invoice, list_invoices);
    collection_reads!(bills, Bill, BillId, get_bill, list_bills);
    collection_reads!(dues, Due, DueId, get_due, list_dues);
    collection_reads!(users, User, UserId, get_user, list_users);

    pub fn profile(&self, shop_id: ShopId) -> Result<Option<ShopProfile>, StoreError> {
        Ok(self.read()?.profiles.get(&shop_id).cloned())
    }

    /// Committed value of a sequence counter (0 if never bumped).
    pub fn sequence_value(
        &self,
        shop_id: ShopId,
        kind: SequenceKind,
        year: Option<i32>,
    ) -> Result<u64, StoreError> {
        Ok(self
            .read()?
            .counters
            .get(&(shop_id, kind, year))
            .copied()
            .unwrap_or(0))
    }
}
