//! Capability checks and the built-in role set.
//!
//! Authorization is a pure bitwise test: a principal may perform an action
//! only when its role carries *every* requested bit. Principals without a
//! role (anonymous callers, or accounts whose role was removed) can do
//! nothing.

use reelshelf_model::{Permissions, Role, User, roles};

use crate::error::{Result, ShelfError};

/// `true` iff `role` grants every bit of `requested`.
pub fn can(role: Option<&Role>, requested: Permissions) -> bool {
    role.is_some_and(|role| role.permissions.contains(requested))
}

/// The caller an operation is performed on behalf of.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Anonymous,
    Authenticated { user: User, role: Option<Role> },
}

impl Principal {
    pub fn authenticated(user: User, role: Option<Role>) -> Self {
        Principal::Authenticated { user, role }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated { user, .. } => Some(user),
        }
    }

    pub fn role(&self) -> Option<&Role> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated { role, .. } => role.as_ref(),
        }
    }

    pub fn can(&self, requested: Permissions) -> bool {
        can(self.role(), requested)
    }

    pub fn is_administrator(&self) -> bool {
        self.can(Permissions::ADMINISTER)
    }

    /// Return the authenticated user if it holds `requested`.
    pub fn require(&self, requested: Permissions) -> Result<&User> {
        let user = self.user().ok_or(ShelfError::Unauthenticated)?;
        if !self.can(requested) {
            return Err(ShelfError::PermissionDenied(format!(
                "requires {:?}",
                requested
            )));
        }
        Ok(user)
    }
}

/// Declarative description of one role to reconcile into storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSeed {
    pub name: String,
    pub permissions: Permissions,
    pub is_default: bool,
}

impl RoleSeed {
    pub fn new(
        name: impl Into<String>,
        permissions: Permissions,
        is_default: bool,
    ) -> Self {
        Self {
            name: name.into(),
            permissions,
            is_default,
        }
    }
}

/// `User` (default), `Moderator` and `Administrator`.
pub fn default_role_seeds() -> Vec<RoleSeed> {
    let user = Permissions::BORROW | Permissions::RETURN;
    vec![
        RoleSeed::new(roles::USER, user, true),
        RoleSeed::new(roles::MODERATOR, user | Permissions::MODERATE_MOVIE, false),
        RoleSeed::new(roles::ADMINISTRATOR, Permissions::ALL, false),
    ]
}

/// Reject seed sets that would break the single-default invariant or name a
/// role twice.
pub fn validate_seeds(seeds: &[RoleSeed]) -> Result<()> {
    let defaults = seeds.iter().filter(|seed| seed.is_default).count();
    if defaults != 1 {
        return Err(ShelfError::Validation(format!(
            "exactly one default role is required, found {defaults}"
        )));
    }

    for (index, seed) in seeds.iter().enumerate() {
        if seed.name.trim().is_empty() {
            return Err(ShelfError::Validation(
                "role name must not be empty".into(),
            ));
        }
        if seeds[..index].iter().any(|other| other.name == seed.name) {
            return Err(ShelfError::Validation(format!(
                "role {} is listed twice",
                seed.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelshelf_model::RoleID;

    fn role(permissions: Permissions) -> Role {
        Role {
            id: RoleID::new(),
            name: "test".into(),
            is_default: false,
            permissions,
        }
    }

    fn user() -> User {
        User::new("a@example.com", "a", "hash", None, 7)
    }

    #[test]
    fn can_requires_every_bit() {
        let borrower = role(Permissions::BORROW | Permissions::RETURN);

        assert!(can(Some(&borrower), Permissions::BORROW));
        assert!(can(Some(&borrower), Permissions::BORROW | Permissions::RETURN));
        assert!(!can(
            Some(&borrower),
            Permissions::BORROW | Permissions::MODERATE_MOVIE
        ));
        assert!(!can(Some(&borrower), Permissions::ADMINISTER));
    }

    #[test]
    fn missing_role_can_do_nothing() {
        assert!(!can(None, Permissions::BORROW));
        assert!(!Principal::Anonymous.can(Permissions::BORROW));
        assert!(!Principal::authenticated(user(), None).can(Permissions::RETURN));
    }

    #[test]
    fn administrator_holds_every_bit() {
        let admin = Principal::authenticated(user(), Some(role(Permissions::ALL)));
        assert!(admin.is_administrator());
        assert!(admin.can(Permissions::MODERATE_MOVIE | Permissions::BORROW));
    }

    #[test]
    fn require_distinguishes_anonymous_from_denied() {
        assert!(matches!(
            Principal::Anonymous.require(Permissions::BORROW),
            Err(ShelfError::Unauthenticated)
        ));

        let borrower = Principal::authenticated(
            user(),
            Some(role(Permissions::BORROW | Permissions::RETURN)),
        );
        assert!(borrower.require(Permissions::BORROW).is_ok());
        assert!(matches!(
            borrower.require(Permissions::MODERATE_MOVIE),
            Err(ShelfError::PermissionDenied(_))
        ));
    }

    #[test]
    fn default_seeds_are_valid() {
        let seeds = default_role_seeds();
        validate_seeds(&seeds).unwrap();

        let admin = seeds
            .iter()
            .find(|seed| seed.name == roles::ADMINISTRATOR)
            .unwrap();
        assert_eq!(admin.permissions.bits(), 0xff);

        let default = seeds.iter().find(|seed| seed.is_default).unwrap();
        assert_eq!(default.name, roles::USER);
        assert_eq!(default.permissions.bits(), 0x03);
    }

    #[test]
    fn seeds_need_exactly_one_default() {
        let none = vec![RoleSeed::new("A", Permissions::BORROW, false)];
        let two = vec![
            RoleSeed::new("A", Permissions::BORROW, true),
            RoleSeed::new("B", Permissions::BORROW, true),
        ];
        assert!(validate_seeds(&none).is_err());
        assert!(validate_seeds(&two).is_err());
    }

    #[test]
    fn seeds_reject_duplicate_names() {
        let seeds = vec![
            RoleSeed::new("A", Permissions::BORROW, true),
            RoleSeed::new("A", Permissions::RETURN, false),
        ];
        assert!(matches!(
            validate_seeds(&seeds),
            Err(ShelfError::Validation(_))
        ));
    }
}
