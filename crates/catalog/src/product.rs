use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{Document, DomainError, DomainResult, ProductId, ShopId};

/// Document: a sellable product with on-hand stock.
///
/// `quantity` is the only field the billing transaction mutates; everything
/// else changes through direct edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub shop_id: ShopId,
    /// Minted human-readable code (e.g. `PRD-0001`).
    pub code: String,
    pub name: String,
    /// On-hand quantity. Never negative.
    pub quantity: i64,
    /// Unit price in minor currency units.
    pub price: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input: fields the caller supplies when creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i64,
    pub price: u64,
}

/// Input: partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<u64>,
}

impl Product {
    pub fn create(
        shop_id: ShopId,
        id: ProductId,
        code: String,
        input: NewProduct,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if input.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }

        Ok(Self {
            id,
            shop_id,
            code,
            name: input.name,
            quantity: input.quantity,
            price: input.price,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial edit. Any field may change, including a direct
    /// quantity set (how restocking from a purchase is recorded).
    pub fn apply_patch(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(quantity) = patch.quantity {
            if quantity < 0 {
                return Err(DomainError::validation("quantity cannot be negative"));
            }
            self.quantity = quantity;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Deduct stock, failing if fewer than `requested` units are on hand.
    ///
    /// The error names the product and both quantities; the HTTP layer
    /// passes that message through verbatim.
    pub fn deduct(&mut self, requested: i64) -> DomainResult<()> {
        if requested <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if self.quantity < requested {
            return Err(DomainError::insufficient_stock(
                &self.name,
                self.quantity,
                requested,
            ));
        }
        self.quantity -= requested;
        Ok(())
    }

    /// Return units to the shelf (inverse of `deduct`, used on bill
    /// delete/edit).
    pub fn restock(&mut self, units: i64) -> DomainResult<()> {
        if units <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.quantity = self
            .quantity
            .checked_add(units)
            .ok_or_else(|| DomainError::validation("stock quantity overflow"))?;
        Ok(())
    }
}

impl Document for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_shop_id() -> ShopId {
        ShopId::new()
    }

    fn test_product(quantity: i64) -> Product {
        Product::create(
            test_shop_id(),
            ProductId::new(),
            "PRD-0001".to_string(),
            NewProduct {
                name: "Sugar 1kg".to_string(),
                quantity,
                price: 9500,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_product_rejects_empty_name() {
        let err = Product::create(
            test_shop_id(),
            ProductId::new(),
            "PRD-0001".to_string(),
            NewProduct {
                name: "   ".to_string(),
                quantity: 1,
                price: 100,
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
    fn create_product_rejects_negative_quantity() {
        let err = Product::create(
            test_shop_id(),
            ProductId::new(),
            "PRD-0001".to_string(),
            NewProduct {
                name: "Sugar 1kg".to_string(),
                quantity: -1,
                price: 100,
            },
            Utc::now(),
        )
        .unwrap_err();

        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for negative quantity"),
        }
    }

    #[test]
    fn deduct_reduces_quantity() {
        let mut product = test_product(10);
        product.deduct(4).unwrap();
        assert_eq!(product.quantity, 6);
    }

    #[test]
    fn deduct_rejects_overdraw_and_names_the_product() {
        let mut product = test_product(3);
        let err = product.deduct(5).unwrap_err();

        match &err {
            DomainError::InsufficientStock {
                product: name,
                available,
                requested,
            } => {
                assert_eq!(name, "Sugar 1kg");
                assert_eq!(*available, 3);
                assert_eq!(*requested, 5);
            }
            _ => panic!("Expected InsufficientStock error"),
        }
        // Failed deduction leaves stock untouched.
        assert_eq!(product.quantity, 3);
    }

    #[test]
    fn deduct_rejects_non_positive_request() {
        let mut product = test_product(10);
        assert!(matches!(
            product.deduct(0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            product.deduct(-2),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(product.quantity, 10);
    }

    #[test]
    fn cumulative_deductions_check_the_decremented_quantity() {
        let mut product = test_product(10);
        product.deduct(6).unwrap();
        let err = product.deduct(6).unwrap_err();
        match err {
            DomainError::InsufficientStock { available, .. } => assert_eq!(available, 4),
            _ => panic!("Expected InsufficientStock error"),
        }
    }

    #[test]
    fn restock_is_the_inverse_of_deduct() {
        let mut product = test_product(10);
        product.deduct(7).unwrap();
        product.restock(7).unwrap();
        assert_eq!(product.quantity, 10);
    }

    #[test]
    fn restock_rejects_quantity_overflow() {
        let mut product = test_product(i64::MAX);
        let err = product.restock(1).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for stock overflow"),
        }
        // A rejected restock leaves stock untouched.
        assert_eq!(product.quantity, i64::MAX);
    }

    #[test]
    fn patch_can_set_any_field() {
        let mut product = test_product(10);
        product
            .apply_patch(
                ProductPatch {
                    name: Some("Sugar 5kg".to_string()),
                    quantity: Some(40),
                    price: Some(45000),
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(product.name, "Sugar 5kg");
        assert_eq!(product.quantity, 40);
        assert_eq!(product.price, 45000);
    }

    #[test]
    fn patch_rejects_negative_quantity() {
        let mut product = test_product(10);
        let err = product
            .apply_patch(
                ProductPatch {
                    quantity: Some(-5),
                    ..ProductPatch::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for negative quantity"),
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a successful deduction never drives quantity negative.
            #[test]
            fn deduct_never_goes_negative(
                on_hand in 0i64..10_000,
                requested in 1i64..10_000
            ) {
                let mut product = test_product(on_hand);
                let before = product.quantity;

                match product.deduct(requested) {
                    Ok(()) => {
                        prop_assert!(before >= requested);
                        prop_assert_eq!(product.quantity, before - requested);
                        prop_assert!(product.quantity >= 0);
                    }
                    Err(_) => {
                        // Rejected deductions must not touch stock.
                        prop_assert_eq!(product.quantity, before);
                    }
                }
            }

            /// Property: deduct followed by restock restores the exact quantity.
            #[test]
            fn deduct_then_restock_round_trips(
                on_hand in 1i64..10_000,
                take in 1i64..10_000
            ) {
                let mut product = test_product(on_hand);
                if product.deduct(take).is_ok() {
                    product.restock(take).unwrap();
                }
                prop_assert_eq!(product.quantity, on_hand);
            }
        }
    }
}
