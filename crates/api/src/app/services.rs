//! Application services: store wiring plus the transactional write paths
//! behind each mutating route.
//!
//! Every method here runs as one atomic transaction. In-transaction scans
//! back the referential rules (kit components must exist, suppliers with
//! invoices on file cannot be deleted, one user per email). The bill
//! lifecycle itself lives in [`shopledger_store::BillingService`].

use std::sync::Arc;

use chrono::{Datelike, Utc};

use shopledger_auth::{NewUser, Role, User, UserPatch};
use shopledger_billing::{Due, DuePatch, NewDue};
use shopledger_catalog::{Kit, KitComponent, KitPatch, NewKit, NewProduct, Product, ProductPatch};
use shopledger_core::{DomainError, DueId, InvoiceId, KitId, ProductId, ShopId, SupplierId, UserId};
use shopledger_invoicing::{Invoice, InvoicePatch, NewInvoice};
use shopledger_parties::{NewSupplier, Supplier, SupplierPatch};
use shopledger_shop::{ProfileUpdate, ShopProfile};
use shopledger_store::{BillingService, MemoryStore, OperationError, SequenceKind, Tx, format_number};

/// Shared application services handed to every request handler.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<MemoryStore>,
    pub billing: BillingService,
}

/// Wire up the store and the services backing the API.
pub fn build_services() -> AppServices {
    let store = Arc::new(MemoryStore::new());
    let billing = BillingService::new(Arc::clone(&store));
    AppServices { store, billing }
}

fn ensure_components_exist(tx: &Tx<'_>, components: &[KitComponent]) -> Result<(), OperationError> {
    for component in components {
        if tx.product(component.product_id).is_none() {
            return Err(DomainError::not_found(format!("product {}", component.product_id)).into());
        }
    }
    Ok(())
}

impl AppServices {
    // -------------------------
    // Products
    // -------------------------

    pub fn create_product(
        &self,
        shop_id: ShopId,
        input: NewProduct,
    ) -> Result<Product, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let seq = tx.next_sequence(SequenceKind::Product, None);
            let code = format_number(SequenceKind::Product, None, seq);
            let product = Product::create(shop_id, ProductId::new(), code, input, now)?;
            tx.put_product(product.clone());
            Ok(product)
        })
    }

    pub fn update_product(
        &self,
        shop_id: ShopId,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut product = tx
                .product(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
            product.apply_patch(patch, now)?;
            tx.put_product(product.clone());
            Ok(product)
        })
    }

    pub fn delete_product(&self, shop_id: ShopId, id: ProductId) -> Result<(), OperationError> {
        self.store.transaction(shop_id, |tx| {
            if tx.product(id).is_none() {
                return Err(DomainError::not_found(format!("product {id}")).into());
            }
            tx.remove_product(id);
            Ok(())
        })
    }

    // -------------------------
    // Kits
    // -------------------------

    pub fn create_kit(&self, shop_id: ShopId, input: NewKit) -> Result<Kit, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            ensure_components_exist(tx, &input.components)?;
            let seq = tx.next_sequence(SequenceKind::Kit, None);
            let code = format_number(SequenceKind::Kit, None, seq);
            let kit = Kit::create(shop_id, KitId::new(), code, input, now)?;
            tx.put_kit(kit.clone());
            Ok(kit)
        })
    }

    pub fn update_kit(
        &self,
        shop_id: ShopId,
        id: KitId,
        patch: KitPatch,
    ) -> Result<Kit, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut kit = tx
                .kit(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("kit {id}")))?;
            if let Some(components) = &patch.components {
                ensure_components_exist(tx, components)?;
            }
            kit.apply_patch(patch, now)?;
            tx.put_kit(kit.clone());
            Ok(kit)
        })
    }

    pub fn delete_kit(&self, shop_id: ShopId, id: KitId) -> Result<(), OperationError> {
        self.store.transaction(shop_id, |tx| {
            if tx.kit(id).is_none() {
                return Err(DomainError::not_found(format!("kit {id}")).into());
            }
            tx.remove_kit(id);
            Ok(())
        })
    }

    // -------------------------
    // Suppliers
    // -------------------------

    pub fn create_supplier(
        &self,
        shop_id: ShopId,
        input: NewSupplier,
    ) -> Result<Supplier, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let supplier = Supplier::create(shop_id, SupplierId::new(), input, now)?;
            tx.put_supplier(supplier.clone());
            Ok(supplier)
        })
    }

    pub fn update_supplier(
        &self,
        shop_id: ShopId,
        id: SupplierId,
        patch: SupplierPatch,
    ) -> Result<Supplier, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut supplier = tx
                .supplier(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
            supplier.apply_patch(patch, now)?;
            tx.put_supplier(supplier.clone());
            Ok(supplier)
        })
    }

    /// Deleting a supplier is refused while invoices still reference it.
    pub fn delete_supplier(&self, shop_id: ShopId, id: SupplierId) -> Result<(), OperationError> {
        self.store.transaction(shop_id, |tx| {
            if tx.supplier(id).is_none() {
                return Err(DomainError::not_found(format!("supplier {id}")).into());
            }
            if tx.invoices().iter().any(|invoice| invoice.supplier_id == id) {
                return Err(DomainError::conflict("supplier has invoices on file").into());
            }
            tx.remove_supplier(id);
            Ok(())
        })
    }

    // -------------------------
    // Invoices
    // -------------------------

    pub fn create_invoice(
        &self,
        shop_id: ShopId,
        input: NewInvoice,
    ) -> Result<Invoice, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            if tx.supplier(input.supplier_id).is_none() {
                return Err(
                    DomainError::not_found(format!("supplier {}", input.supplier_id)).into(),
                );
            }

            let year = input.invoice_date.year();
            let seq = tx.next_sequence(SequenceKind::Invoice, Some(year));
            let number = format_number(SequenceKind::Invoice, Some(year), seq);

            let invoice = Invoice::create(shop_id, InvoiceId::new(), number, input, now)?;
            tx.put_invoice(invoice.clone());
            Ok(invoice)
        })
    }

    pub fn update_invoice(
        &self,
        shop_id: ShopId,
        id: InvoiceId,
        patch: InvoicePatch,
    ) -> Result<Invoice, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut invoice = tx
                .invoice(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("invoice {id}")))?;
            if let Some(supplier_id) = patch.supplier_id {
                if tx.supplier(supplier_id).is_none() {
                    return Err(DomainError::not_found(format!("supplier {supplier_id}")).into());
                }
            }
            invoice.apply_patch(patch, now)?;
            tx.put_invoice(invoice.clone());
            Ok(invoice)
        })
    }

    pub fn delete_invoice(&self, shop_id: ShopId, id: InvoiceId) -> Result<(), OperationError> {
        self.store.transaction(shop_id, |tx| {
            if tx.invoice(id).is_none() {
                return Err(DomainError::not_found(format!("invoice {id}")).into());
            }
            tx.remove_invoice(id);
            Ok(())
        })
    }

    // -------------------------
    // Dues
    // -------------------------

    pub fn create_due(&self, shop_id: ShopId, input: NewDue) -> Result<Due, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let due = Due::create(shop_id, DueId::new(), input, now)?;
            tx.put_due(due.clone());
            Ok(due)
        })
    }

    pub fn update_due(
        &self,
        shop_id: ShopId,
        id: DueId,
        patch: DuePatch,
    ) -> Result<Due, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut due = tx
                .due(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("due {id}")))?;
            due.apply_patch(patch, now)?;
            tx.put_due(due.clone());
            Ok(due)
        })
    }

    pub fn settle_due(&self, shop_id: ShopId, id: DueId) -> Result<Due, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut due = tx
                .due(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("due {id}")))?;
            due.settle(now)?;
            tx.put_due(due.clone());
            Ok(due)
        })
    }

    pub fn delete_due(&self, shop_id: ShopId, id: DueId) -> Result<(), OperationError> {
        self.store.transaction(shop_id, |tx| {
            if tx.due(id).is_none() {
                return Err(DomainError::not_found(format!("due {id}")).into());
            }
            tx.remove_due(id);
            Ok(())
        })
    }

    // -------------------------
    // Users
    // -------------------------

    pub fn create_user(&self, shop_id: ShopId, input: NewUser) -> Result<User, OperationError> {
        let now = Utc::now();
        let normalized_email = input.email.trim().to_lowercase();
        self.store.transaction(shop_id, |tx| {
            if tx.users().iter().any(|user| user.email == normalized_email) {
                return Err(DomainError::conflict("a user with this email already exists").into());
            }
            let user = User::create(shop_id, UserId::new(), input, now)?;
            tx.put_user(user.clone());
            Ok(user)
        })
    }

    /// Role grants are escalation-guarded: the acting principal must hold
    /// `admin` or the role being granted.
    pub fn update_user(
        &self,
        shop_id: ShopId,
        id: UserId,
        patch: UserPatch,
        actor_roles: &[Role],
    ) -> Result<User, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut user = tx
                .user(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
            user.apply_patch(patch, actor_roles, now)?;
            tx.put_user(user.clone());
            Ok(user)
        })
    }

    pub fn disable_user(&self, shop_id: ShopId, id: UserId) -> Result<User, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let mut user = tx
                .user(id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
            user.disable(now)?;
            tx.put_user(user.clone());
            Ok(user)
        })
    }

    // -------------------------
    // Shop profile
    // -------------------------

    pub fn update_profile(
        &self,
        shop_id: ShopId,
        input: ProfileUpdate,
    ) -> Result<ShopProfile, OperationError> {
        let now = Utc::now();
        self.store.transaction(shop_id, |tx| {
            let profile = ShopProfile::upsert(shop_id, input, now)?;
            tx.put_profile(profile.clone());
            Ok(profile)
        })
    }
}
