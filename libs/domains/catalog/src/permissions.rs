//! Role-based write permissions for catalog resources.
//!
//! Permission decisions are pure functions over an explicit role set rather
//! than middleware-level policy objects: handlers derive a [`RoleSet`] from
//! the verified JWT claims (or the anonymous set) and ask [`allow`] whether
//! the operation may proceed. A deny is a value, never an error — handlers
//! translate it into a structured 403 response.

use crate::error::{CatalogError, CatalogResult};
use axum::http::Method;
use axum_helpers::auth::JwtClaims;

/// Role name carried in JWT claims for staff users (sellers)
pub const ROLE_SELLER: &str = "seller";
/// Role name carried in JWT claims for superusers (admins)
pub const ROLE_ADMIN: &str = "admin";

/// The catalog resources writes are gated on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Category,
    Product,
}

/// The caller's effective roles.
///
/// Anonymous callers get the default (all false) set. Authenticated callers
/// always have `authenticated`; `seller` and `admin` mirror the staff and
/// superuser flags of the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet {
    pub authenticated: bool,
    pub seller: bool,
    pub admin: bool,
}

impl RoleSet {
    /// The role set of an unauthenticated caller
    pub const fn anonymous() -> Self {
        Self {
            authenticated: false,
            seller: false,
            admin: false,
        }
    }

    /// Build a role set from role names (e.g. out of JWT claims)
    pub fn from_roles<'a>(roles: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self {
            authenticated: true,
            seller: false,
            admin: false,
        };

        for role in roles {
            match role {
                ROLE_SELLER => set.seller = true,
                ROLE_ADMIN => set.admin = true,
                _ => {}
            }
        }

        set
    }

    /// Build a role set from verified JWT claims; `None` means anonymous
    pub fn from_claims(claims: Option<&JwtClaims>) -> Self {
        match claims {
            Some(claims) => Self::from_roles(claims.roles.iter().map(String::as_str)),
            None => Self::anonymous(),
        }
    }
}

/// Read methods are open to everyone
fn is_safe_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

/// Decide whether `roles` may perform `method` on `resource`.
///
/// Precedence:
/// 1. Safe methods (GET/HEAD/OPTIONS) are allowed for any caller.
/// 2. Category writes require an authenticated admin.
/// 3. Product writes require an authenticated seller or admin.
pub fn allow(roles: &RoleSet, method: &Method, resource: ResourceKind) -> bool {
    if is_safe_method(method) {
        return true;
    }

    match resource {
        ResourceKind::Category => roles.authenticated && roles.admin,
        ResourceKind::Product => roles.authenticated && (roles.seller || roles.admin),
    }
}

/// Handler-side permission check: translates a deny into a structured
/// [`CatalogError::PermissionDenied`].
pub fn authorize(
    claims: Option<&JwtClaims>,
    method: &Method,
    resource: ResourceKind,
) -> CatalogResult<()> {
    let roles = RoleSet::from_claims(claims);

    if allow(&roles, method, resource) {
        Ok(())
    } else {
        tracing::debug!(
            authenticated = roles.authenticated,
            seller = roles.seller,
            admin = roles.admin,
            method = %method,
            "Denied {:?} write",
            resource
        );
        Err(CatalogError::PermissionDenied(
            "You do not have permission to perform this action.".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANONYMOUS: RoleSet = RoleSet::anonymous();
    const CUSTOMER: RoleSet = RoleSet {
        authenticated: true,
        seller: false,
        admin: false,
    };
    const SELLER: RoleSet = RoleSet {
        authenticated: true,
        seller: true,
        admin: false,
    };
    const ADMIN: RoleSet = RoleSet {
        authenticated: true,
        seller: false,
        admin: true,
    };

    const READ_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::OPTIONS];

    fn write_methods() -> [Method; 4] {
        [Method::POST, Method::PUT, Method::PATCH, Method::DELETE]
    }

    #[test]
    fn test_reads_allowed_for_everyone() {
        for roles in [ANONYMOUS, CUSTOMER, SELLER, ADMIN] {
            for method in &READ_METHODS {
                for resource in [ResourceKind::Category, ResourceKind::Product] {
                    assert!(
                        allow(&roles, method, resource),
                        "read {:?} {:?} should be allowed for {:?}",
                        method,
                        resource,
                        roles
                    );
                }
            }
        }
    }

    #[test]
    fn test_category_writes_admin_only() {
        for method in write_methods() {
            assert!(!allow(&ANONYMOUS, &method, ResourceKind::Category));
            assert!(!allow(&CUSTOMER, &method, ResourceKind::Category));
            assert!(!allow(&SELLER, &method, ResourceKind::Category));
            assert!(allow(&ADMIN, &method, ResourceKind::Category));
        }
    }

    #[test]
    fn test_product_writes_seller_or_admin() {
        for method in write_methods() {
            assert!(!allow(&ANONYMOUS, &method, ResourceKind::Product));
            assert!(!allow(&CUSTOMER, &method, ResourceKind::Product));
            assert!(allow(&SELLER, &method, ResourceKind::Product));
            assert!(allow(&ADMIN, &method, ResourceKind::Product));
        }
    }

    #[test]
    fn test_unauthenticated_role_flags_do_not_grant_access() {
        // A forged role set with flags but no authentication stays denied
        let forged = RoleSet {
            authenticated: false,
            seller: true,
            admin: true,
        };

        assert!(!allow(&forged, &Method::POST, ResourceKind::Product));
        assert!(!allow(&forged, &Method::DELETE, ResourceKind::Category));
    }

    #[test]
    fn test_role_set_from_roles() {
        let set = RoleSet::from_roles(["customer", "seller"]);
        assert!(set.authenticated);
        assert!(set.seller);
        assert!(!set.admin);

        let set = RoleSet::from_roles(["admin"]);
        assert!(set.admin);
        assert!(!set.seller);

        // Unknown role names are ignored
        let set = RoleSet::from_roles(["superhero"]);
        assert!(set.authenticated);
        assert!(!set.seller);
        assert!(!set.admin);
    }

    #[test]
    fn test_authorize_returns_structured_deny() {
        let err = authorize(None, &Method::POST, ResourceKind::Product).unwrap_err();
        assert!(matches!(err, CatalogError::PermissionDenied(_)));

        assert!(authorize(None, &Method::GET, ResourceKind::Product).is_ok());
    }
}
