use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{Document, DomainError, DomainResult, ShopId, SupplierId};

/// Contact information for a supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Document: a supplier the shop buys from. Referenced by invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub shop_id: ShopId,
    pub name: String,
    pub contact: ContactInfo,
    /// Tax registration number, if the supplier has one.
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input: fields the caller supplies when registering a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
    pub tax_id: Option<String>,
}

/// Input: partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact: Option<ContactInfo>,
    pub tax_id: Option<Option<String>>,
}

impl Supplier {
    pub fn create(
        shop_id: ShopId,
        id: SupplierId,
        input: NewSupplier,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self {
            id,
            shop_id,
            name: input.name,
            contact: input.contact,
            tax_id: input.tax_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: SupplierPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(contact) = patch.contact {
            self.contact = contact;
        }
        if let Some(tax_id) = patch.tax_id {
            self.tax_id = tax_id;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Document for Supplier {
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_supplier_rejects_empty_name() {
        let err = Supplier::create(
            ShopId::new(),
            SupplierId::new(),
            NewSupplier {
                name: "  ".to_string(),
                contact: ContactInfo::default(),
                tax_id: None,
            },
            Utc::now(),
        )
        .unwrap_err();

        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn patch_can_clear_tax_id() {
        let mut supplier = Supplier::create(
            ShopId::new(),
            SupplierId::new(),
            NewSupplier {
                name: "Mehran Traders".to_string(),
                contact: ContactInfo {
                    phone: Some("0300-1234567".to_string()),
                    ..ContactInfo::default()
                },
                tax_id: Some("NTN-998877".to_string()),
            },
            Utc::now(),
        )
        .unwrap();

        supplier
            .apply_patch(
                SupplierPatch {
                    tax_id: Some(None),
                    ..SupplierPatch::default()
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(supplier.tax_id, None);
        assert_eq!(supplier.name, "Mehran Traders");
    }
}
