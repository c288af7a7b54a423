use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{Document, DomainError, DomainResult, DueId, ShopId};

/// Document: an amount a customer still owes the shop, tracked outside any
/// particular bill. Settling is one-way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    pub id: DueId,
    pub shop_id: ShopId,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    /// Amount owed, minor currency units.
    pub amount: u64,
    pub note: Option<String>,
    pub settled: bool,
    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input: fields the caller supplies when recording a due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDue {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub amount: u64,
    pub note: Option<String>,
}

/// Input: partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuePatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<Option<String>>,
    pub amount: Option<u64>,
    pub note: Option<Option<String>>,
}

impl Due {
    pub fn create(shop_id: ShopId, id: DueId, input: NewDue, now: DateTime<Utc>) -> DomainResult<Self> {
        if input.customer_name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        if input.amount == 0 {
            return Err(DomainError::validation("due amount must be positive"));
        }

        Ok(Self {
            id,
            shop_id,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            amount: input.amount,
            note: input.note,
            settled: false,
            settled_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Edits are only allowed while the due is open.
    pub fn apply_patch(&mut self, patch: DuePatch, now: DateTime<Utc>) -> DomainResult<()> {
        if self.settled {
            return Err(DomainError::conflict("settled dues cannot be edited"));
        }
        if let Some(customer_name) = patch.customer_name {
            if customer_name.trim().is_empty() {
                return Err(DomainError::validation("customer name cannot be empty"));
            }
            self.customer_name = customer_name;
        }
        if let Some(customer_phone) = patch.customer_phone {
            self.customer_phone = customer_phone;
        }
        if let Some(amount) = patch.amount {
            if amount == 0 {
                return Err(DomainError::validation("due amount must be positive"));
            }
            self.amount = amount;
        }
        if let Some(note) = patch.note {
            self.note = note;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn settle(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.settled {
            return Err(DomainError::conflict("due is already settled"));
        }
        self.settled = true;
        self.settled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

impl Document for Due {
    type Id = DueId;

    fn id(&self) -> DueId {
        self.id
    }
}
