//! User documents for identity management.
//!
//! Users are shop-scoped: a user belongs to exactly one shop and carries the
//! roles granted there. Role changes go through an escalation guard so a
//! principal can never hand out roles it does not itself hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopledger_core::{Document, DomainError, DomainResult, ShopId, UserId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User Status
// ─────────────────────────────────────────────────────────────────────────────

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    /// User is active and can authenticate/transact.
    #[default]
    Active,
    /// User is disabled and cannot authenticate.
    Disabled,
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "Active"),
            UserStatus::Disabled => write!(f, "Disabled"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User Document
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Partial update for a user.
///
/// Role replacement is escalation-guarded: see [`User::apply_patch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub display_name: Option<String>,
    pub roles: Option<Vec<Role>>,
}

/// A shop user.
///
/// # Invariants
/// - A user belongs to exactly one shop (`shop_id` is immutable after creation).
/// - Roles are shop-scoped (no cross-shop role grants).
/// - Disabled users cannot have their roles changed.
/// - Actors cannot grant roles they do not hold (except `admin`, who can grant
///   any role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub shop_id: ShopId,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<Role>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user from validated input.
    ///
    /// Emails are stored trimmed and lowercased so lookups are
    /// case-insensitive.
    pub fn create(
        shop_id: ShopId,
        id: UserId,
        input: NewUser,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.email.trim().is_empty() || !input.email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        if input.display_name.trim().is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }
        validate_role_set(&input.roles)?;

        Ok(Self {
            id,
            shop_id,
            email: input.email.trim().to_lowercase(),
            display_name: input.display_name.trim().to_string(),
            roles: input.roles,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update on behalf of an actor.
    ///
    /// Newly granted roles require the actor to hold either `admin` or the
    /// role being granted; revocations need no grant. Role changes on a
    /// disabled user are rejected.
    pub fn apply_patch(
        &mut self,
        patch: UserPatch,
        actor_roles: &[Role],
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(display_name) = patch.display_name {
            if display_name.trim().is_empty() {
                return Err(DomainError::validation("display name cannot be empty"));
            }
            self.display_name = display_name.trim().to_string();
        }

        if let Some(roles) = patch.roles {
            if self.status == UserStatus::Disabled {
                return Err(DomainError::conflict("user is disabled"));
            }
            validate_role_set(&roles)?;

            let actor_has_admin = actor_roles.iter().any(|r| r.is_admin());
            for granted in roles.iter().filter(|r| !self.holds(r)) {
                let actor_has_role = actor_roles.iter().any(|r| r.as_str() == granted.as_str());
                if !actor_has_admin && !actor_has_role {
                    return Err(DomainError::Unauthorized);
                }
            }

            self.roles = roles;
        }

        self.updated_at = now;
        Ok(())
    }

    /// Disable the user. Disabled users fail authentication.
    pub fn disable(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status == UserStatus::Disabled {
            return Err(DomainError::conflict("user already disabled"));
        }
        self.status = UserStatus::Disabled;
        self.updated_at = now;
        Ok(())
    }

    fn holds(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r.as_str() == role.as_str())
    }
}

impl Document for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

fn validate_role_set(roles: &[Role]) -> DomainResult<()> {
    for (i, role) in roles.iter().enumerate() {
        if role.as_str().trim().is_empty() {
            return Err(DomainError::validation("role name cannot be empty"));
        }
        if roles[..i].iter().any(|r| r.as_str() == role.as_str()) {
            return Err(DomainError::validation(format!(
                "duplicate role: {role}"
            )));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn sample_user(roles: Vec<Role>) -> User {
        User::create(
            ShopId::new(),
            UserId::new(),
            NewUser {
                email: "alice@example.com".to_string(),
                display_name: "Alice Smith".to_string(),
                roles,
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn create_user_normalizes_email() {
        let user = User::create(
            ShopId::new(),
            UserId::new(),
            NewUser {
                email: "  Bob@Example.COM ".to_string(),
                display_name: "  Bob  ".to_string(),
                roles: vec![Role::new("cashier")],
            },
            now(),
        )
        .unwrap();

        assert_eq!(user.email, "bob@example.com");
        assert_eq!(user.display_name, "Bob");
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn create_user_rejects_invalid_email() {
        let result = User::create(
            ShopId::new(),
            UserId::new(),
            NewUser {
                email: "invalid-email".to_string(),
                display_name: "Alice".to_string(),
                roles: vec![],
            },
            now(),
        );

        match result.unwrap_err() {
            DomainError::Validation(_) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_user_rejects_blank_display_name() {
        let result = User::create(
            ShopId::new(),
            UserId::new(),
            NewUser {
                email: "alice@example.com".to_string(),
                display_name: "   ".to_string(),
                roles: vec![],
            },
            now(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn admin_actor_can_grant_any_role() {
        let mut user = sample_user(vec![Role::new("cashier")]);

        let patch = UserPatch {
            display_name: None,
            roles: Some(vec![Role::new("cashier"), Role::new("manager")]),
        };
        user.apply_patch(patch, &[Role::new("admin")], now())
            .unwrap();

        assert_eq!(user.roles.len(), 2);
    }

    #[test]
    fn actor_holding_the_role_can_grant_it() {
        let mut user = sample_user(vec![]);

        let patch = UserPatch {
            display_name: None,
            roles: Some(vec![Role::new("manager")]),
        };
        user.apply_patch(patch, &[Role::new("manager")], now())
            .unwrap();

        assert_eq!(user.roles[0].as_str(), "manager");
    }

    #[test]
    fn privilege_escalation_is_blocked() {
        let mut user = sample_user(vec![]);

        // A cashier tries to hand out "admin".
        let patch = UserPatch {
            display_name: None,
            roles: Some(vec![Role::new("admin")]),
        };
        let err = user
            .apply_patch(patch, &[Role::new("cashier")], now())
            .unwrap_err();

        assert!(matches!(err, DomainError::Unauthorized));
        assert!(user.roles.is_empty());
    }

    #[test]
    fn revoking_roles_needs_no_grant() {
        let mut user = sample_user(vec![Role::new("manager"), Role::new("cashier")]);

        let patch = UserPatch {
            display_name: None,
            roles: Some(vec![Role::new("cashier")]),
        };
        user.apply_patch(patch, &[], now()).unwrap();

        assert_eq!(user.roles.len(), 1);
        assert_eq!(user.roles[0].as_str(), "cashier");
    }

    #[test]
    fn role_changes_on_disabled_user_are_rejected() {
        let mut user = sample_user(vec![]);
        user.disable(now()).unwrap();

        let patch = UserPatch {
            display_name: None,
            roles: Some(vec![Role::new("cashier")]),
        };
        let err = user
            .apply_patch(patch, &[Role::new("admin")], now())
            .unwrap_err();

        match err {
            DomainError::Conflict(_) => {}
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_roles_in_replacement_are_rejected() {
        let mut user = sample_user(vec![]);

        let patch = UserPatch {
            display_name: None,
            roles: Some(vec![Role::new("cashier"), Role::new("cashier")]),
        };
        let err = user
            .apply_patch(patch, &[Role::new("admin")], now())
            .unwrap_err();

        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn disable_twice_conflicts() {
        let mut user = sample_user(vec![]);

        user.disable(now()).unwrap();
        assert!(user.disable(now()).is_err());
        assert_eq!(user.status, UserStatus::Disabled);
    }
}
