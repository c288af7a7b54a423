//! Request extensions inserted by the auth middleware.

use shopledger_auth::{PrincipalId, Role};
use shopledger_core::ShopId;

/// The shop a request acts on, taken from the token's `shop_id` claim.
///
/// Immutable, and present on every domain route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShopContext(ShopId);

impl ShopContext {
    pub fn new(shop_id: ShopId) -> Self {
        Self(shop_id)
    }

    pub fn shop_id(&self) -> ShopId {
        self.0
    }
}

/// The authenticated caller: principal identity plus the roles the token
/// carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, roles: Vec<Role>) -> Self {
        Self { principal_id, roles }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
