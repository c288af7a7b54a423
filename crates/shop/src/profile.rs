use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{DomainError, DomainResult, ShopId};

/// Document: the shop's own business details, printed on bills and exports.
/// Singleton per shop (keyed by `ShopId` alone).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopProfile {
    pub shop_id: ShopId,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Tax registration number, if the shop has one.
    pub tax_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Input: full replacement of the profile (PUT semantics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

impl ShopProfile {
    pub fn upsert(shop_id: ShopId, input: ProfileUpdate, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("shop name cannot be empty"));
        }

        Ok(Self {
            shop_id,
            name: input.name,
            address: input.address,
            phone: input.phone,
            tax_id: input.tax_id,
            updated_at: now,
        })
    }
}
