//! API-side authorization guard for operations.
//!
//! This enforces authorization at the request boundary (before touching the
//! store), while keeping domain types and the store auth-agnostic.

use shopledger_auth::{
    AuthzError, OperationAuthorization, Permission, Principal, Role, ShopMembership, authorize,
};

use crate::context::{PrincipalContext, ShopContext};

/// Check authorization for an operation in the current request context.
///
/// This is intended to be called **before** running the operation.
pub fn authorize_operation<O: OperationAuthorization>(
    shop: &ShopContext,
    principal: &PrincipalContext,
    operation: &O,
) -> Result<(), AuthzError> {
    let membership = ShopMembership {
        shop_id: shop.shop_id(),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };
    let principal = Principal {
        principal_id: principal.principal_id(),
        active_shop_id: shop.shop_id(),
        membership,
    };

    operation
        .required_permissions()
        .iter()
        .try_for_each(|perm| authorize(&principal, perm))
}

/// Minimal role → permission mapping stub.
///
/// This is intentionally simple until a real policy source exists (e.g. a
/// per-shop role table).
fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    // Admins hold every permission in their shop.
    if roles.iter().any(Role::is_admin) {
        return vec![Permission::new("*")];
    }

    Vec::new()
}
