use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{Document, DomainError, DomainResult, KitId, ProductId, ShopId};

/// One constituent of a kit: a product and how many units of it each kit
/// contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitComponent {
    pub product_id: ProductId,
    pub per_kit_qty: i64,
}

/// Document: a bundle of products sold as a single line item.
///
/// Kits are read-only during bill creation; they expand into per-product
/// deductions via [`Kit::deductions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    pub id: KitId,
    pub shop_id: ShopId,
    /// Minted human-readable code (e.g. `KIT-0001`).
    pub code: String,
    pub name: String,
    /// Bundle price in minor currency units (independent of component prices).
    pub price: u64,
    /// Ordered, non-empty, no duplicate product.
    pub components: Vec<KitComponent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input: fields the caller supplies when creating a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewKit {
    pub name: String,
    pub price: u64,
    pub components: Vec<KitComponent>,
}

/// Input: partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitPatch {
    pub name: Option<String>,
    pub price: Option<u64>,
    pub components: Option<Vec<KitComponent>>,
}

fn validate_components(components: &[KitComponent]) -> DomainResult<()> {
    if components.is_empty() {
        return Err(DomainError::validation("kit must contain at least one product"));
    }
    for component in components {
        if component.per_kit_qty <= 0 {
            return Err(DomainError::validation("per-kit quantity must be positive"));
        }
    }
    for (i, component) in components.iter().enumerate() {
        if components[..i].iter().any(|c| c.product_id == component.product_id) {
            return Err(DomainError::validation(format!(
                "duplicate product {} in kit components",
                component.product_id
            )));
        }
    }
    Ok(())
}

impl Kit {
    /// Validate and build a kit. Whether each referenced product actually
    /// exists is checked by the storage layer inside the creating
    /// transaction; this only checks shape.
    pub fn create(
        shop_id: ShopId,
        id: KitId,
        code: String,
        input: NewKit,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        validate_components(&input.components)?;

        Ok(Self {
            id,
            shop_id,
            code,
            name: input.name,
            price: input.price,
            components: input.components,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: KitPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(components) = patch.components {
            validate_components(&components)?;
            self.components = components;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Expand `kits` requested kits into per-product deductions, in component
    /// order: `(product_id, per_kit_qty * kits)`. A multiplication that leaves
    /// `i64` is a validation error.
    pub fn deductions(&self, kits: i64) -> DomainResult<Vec<(ProductId, i64)>> {
        self.components
            .iter()
            .map(|c| {
                let units = c
                    .per_kit_qty
                    .checked_mul(kits)
                    .ok_or_else(|| DomainError::validation("kit expansion quantity overflow"))?;
                Ok((c.product_id, units))
            })
            .collect()
    }
}

impl Document for Kit {
    type Id = KitId;

    fn id(&self) -> KitId {
        self.id
    }
}
