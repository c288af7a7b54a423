use std::collections::HashSet;

use thiserror::Error;

use shopledger_core::ShopId;

use crate::{Permission, PrincipalId, ShopMembership};

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from storage and transport: the API derives
/// memberships from token claims plus the role → permission policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub active_shop_id: ShopId,
    pub membership: ShopMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("shop mismatch")]
    ShopMismatch,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Operation-side authorization contract.
///
/// Implement this on request payloads that require permissions; the API layer
/// enforces the requirements before touching the store.
pub trait OperationAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Authorize a principal within its active shop context.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.active_shop_id != principal.membership.shop_id {
        return Err(AuthzError::ShopMismatch);
    }

    let perms: HashSet<&str> = principal
        .membership
        .permissions
        .iter()
        .map(|p| p.as_str())
        .collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
