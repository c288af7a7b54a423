//! Transaction handle: staged writes over a snapshot of committed state.
//!
//! A [`Tx`] is handed to the closure passed to
//! [`crate::MemoryStore::transaction`]. Reads check the transaction's own
//! staged writes before falling back to committed state, so a row that
//! deducts a product is visible to the next row touching the same product.
//! Nothing reaches committed state until the closure returns `Ok` and the
//! staged writes are applied in one go under the same write lock.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use shopledger_auth::User;
use shopledger_billing::{Bill, Due};
use shopledger_catalog::{Kit, Product};
use shopledger_core::{
    BillId, Document, DueId, InvoiceId, KitId, ProductId, ShopId, SupplierId, UserId,
};
use shopledger_invoicing::Invoice;
use shopledger_parties::Supplier;
use shopledger_shop::ShopProfile;

use crate::memory::Inner;
use crate::sequence::SequenceKind;

/// Staged puts and deletes for one collection.
pub(crate) struct StagedTable<Id, D> {
    puts: HashMap<Id, D>,
    deletes: HashSet<Id>,
}

impl<Id, D> Default for StagedTable<Id, D> {
    fn default() -> Self {
        Self {
            puts: HashMap::new(),
            deletes: HashSet::new(),
        }
    }
}

impl<Id, D> StagedTable<Id, D>
where
    Id: Copy + Eq + Hash,
    D: Document<Id = Id> + Clone,
{
    fn get<'a>(
        &'a self,
        base: &'a HashMap<(ShopId, Id), D>,
        shop_id: ShopId,
        id: Id,
    ) -> Option<&'a D> {
        if self.deletes.contains(&id) {
            return None;
        }
        if let Some(doc) = self.puts.get(&id) {
            return Some(doc);
        }
        base.get(&(shop_id, id))
    }

    fn put(&mut self, doc: D) {
        let id = doc.id();
        self.deletes.remove(&id);
        self.puts.insert(id, doc);
    }

    fn remove(&mut self, id: Id) {
        self.puts.remove(&id);
        self.deletes.insert(id);
    }

    fn touches(&self, id: &Id) -> bool {
        self.puts.contains_key(id) || self.deletes.contains(id)
    }

    fn scan<'a>(&'a self, base: &'a HashMap<(ShopId, Id), D>, shop_id: ShopId) -> Vec<&'a D> {
        let mut docs: Vec<&D> = base
            .iter()
            .filter(|((shop, id), _)| *shop == shop_id && !self.touches(id))
            .map(|(_, doc)| doc)
            .collect();
        docs.extend(self.puts.values());
        docs
    }

    fn apply(self, base: &mut HashMap<(ShopId, Id), D>, shop_id: ShopId) -> (usize, usize) {
        let counts = (self.puts.len(), self.deletes.len());
        for id in self.deletes {
            base.remove(&(shop_id, id));
        }
        for (id, doc) in self.puts {
            base.insert((shop_id, id), doc);
        }
        counts
    }
}

/// Everything a transaction wants to change, keyed within one shop.
pub(crate) struct StagedWrites {
    shop_id: ShopId,
    products: StagedTable<ProductId, Product>,
    kits: StagedTable<KitId, Kit>,
    suppliers: StagedTable<SupplierId, Supplier>,
    invoices: StagedTable<InvoiceId, Invoice>,
    bills: StagedTable<BillId, Bill>,
    dues: StagedTable<DueId, Due>,
    users: StagedTable<UserId, User>,
    profile: Option<ShopProfile>,
    /// New absolute counter values, applied on commit.
    counters: HashMap<(SequenceKind, Option<i32>), u64>,
}

impl StagedWrites {
    fn new(shop_id: ShopId) -> Self {
        Self {
            shop_id,
            products: StagedTable::default(),
            kits: StagedTable::default(),
            suppliers: StagedTable::default(),
            invoices: StagedTable::default(),
            bills: StagedTable::default(),
            dues: StagedTable::default(),
            users: StagedTable::default(),
            profile: None,
            counters: HashMap::new(),
        }
    }

    /// Apply every staged write to committed state. Returns (puts, deletes)
    /// counts for logging.
    pub(crate) fn apply(self, inner: &mut Inner) -> (usize, usize) {
        let shop_id = self.shop_id;
        let mut puts = 0;
        let mut deletes = 0;

        for (p, d) in [
            self.products.apply(&mut inner.products, shop_id),
            self.kits.apply(&mut inner.kits, shop_id),
            self.suppliers.apply(&mut inner.suppliers, shop_id),
            self.invoices.apply(&mut inner.invoices, shop_id),
            self.bills.apply(&mut inner.bills, shop_id),
            self.dues.apply(&mut inner.dues, shop_id),
            self.users.apply(&mut inner.users, shop_id),
        ] {
            puts += p;
            deletes += d;
        }

        if let Some(profile) = self.profile {
            inner.profiles.insert(shop_id, profile);
            puts += 1;
        }
        for ((kind, year), value) in self.counters {
            inner.counters.insert((shop_id, kind, year), value);
        }

        (puts, deletes)
    }
}

/// A shop-scoped transaction over the store.
///
/// Reads are staged-then-committed; writes are staged only. The handle never
/// leaves the closure it is lent to.
pub struct Tx<'a> {
    base: &'a Inner,
    staged: StagedWrites,
}

macro_rules! collection_access {
    ($field:ident, $doc:ty, $id:ty, $get:ident, $put:ident, $remove:ident, $scan:ident) => {
        pub fn $get(&self, id: $id) -> Option<&$doc> {
            self.staged
                .$field
                .get(&self.base.$field, self.staged.shop_id, id)
        }

        pub fn $put(&mut self, doc: $doc) {
            self.staged.$field.put(doc);
        }

        pub fn $remove(&mut self, id: $id) {
            self.staged.$field.remove(id);
        }

        pub fn $scan(&self) -> Vec<&$doc> {
            self.staged
                .$field
                .scan(&self.base.$field, self.staged.shop_id)
        }
    };
}

impl<'a> Tx<'a> {
    pub(crate) fn new(base: &'a Inner, shop_id: ShopId) -> Self {
        Self {
            base,
            staged: StagedWrites::new(shop_id),
        }
    }

    pub fn shop_id(&self) -> ShopId {
        self.staged.shop_id
    }

    // Get / put / remove / scan per collection. Scans are used for in-
    // transaction checks (duplicate emails, referential guards), not listing.
    collection_access!(products, Product, ProductId, product, put_product, remove_product, products);
    collection_access!(kits, Kit, KitId, kit, put_kit, remove_kit, kits);
    collection_access!(suppliers, Supplier, SupplierId, supplier, put_supplier, remove_supplier, suppliers);
    collection_access!(invoices, Invoice, InvoiceId, invoice, put_invoice, remove_invoice, invoices);
    collection_access!(bills, Bill, BillId, bill, put_bill, remove_bill, bills);
    collection_access!(dues, Due, DueId, due, put_due, remove_due, dues);
    collection_access!(users, User, UserId, user, put_user, remove_user, users);

    /// The shop profile (singleton per shop).
    pub fn profile(&self) -> Option<&ShopProfile> {
        self.staged
            .profile
            .as_ref()
            .or_else(|| self.base.profiles.get(&self.staged.shop_id))
    }

    pub fn put_profile(&mut self, profile: ShopProfile) {
        self.staged.profile = Some(profile);
    }

    /// Atomically increment-and-read a sequence counter.
    ///
    /// The bump is staged with the rest of the transaction: if the
    /// transaction aborts, the counter is untouched and the number is not
    /// burned.
    pub fn next_sequence(&mut self, kind: SequenceKind, year: Option<i32>) -> u64 {
        let key = (kind, year);
        let current = self
            .staged
            .counters
            .get(&key)
            .copied()
            .or_else(|| {
                self.base
                    .counters
                    .get(&(self.staged.shop_id, kind, year))
                    .copied()
            })
            .unwrap_or(0);
        let next = current + 1;
        self.staged.counters.insert(key, next);
        next
    }

    pub(crate) fn into_staged(self) -> StagedWrites {
        self.staged
    }
}
