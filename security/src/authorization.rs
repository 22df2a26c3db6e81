// security/src/authorization.rs
//
// Pure checks over the built-in role table. Every function is total: a missing
// caller, a missing or unknown role, or an identifier outside the catalog all
// answer "no". Turning a `false` into a 403 is left to the call site.

use models::Principal;

use crate::permissions::Permission;
use crate::roles::{ADMIN, get_role_by_name};

fn caller_role<C: Principal + ?Sized>(caller: Option<&C>) -> Option<&str> {
    caller.and_then(|c| c.role())
}

/// Whether `caller` holds `permission`.
///
/// Admin is granted anything without consulting the table, including
/// identifiers that are not in the catalog.
pub fn has_permission<C, P>(caller: Option<&C>, permission: P) -> bool
where
    C: Principal + ?Sized,
    P: AsRef<str>,
{
    let Some(role) = caller_role(caller) else {
        return false;
    };
    if role == ADMIN {
        return true;
    }
    let Some(definition) = get_role_by_name(role) else {
        return false;
    };
    Permission::lookup(permission.as_ref()).is_some_and(|p| definition.grants(p))
}

/// `true` if at least one of `permissions` is held. An empty list is never satisfied.
pub fn has_any_permission<C, P>(caller: Option<&C>, permissions: &[P]) -> bool
where
    C: Principal + ?Sized,
    P: AsRef<str>,
{
    permissions.iter().any(|p| has_permission(caller, p))
}

/// `true` if every one of `permissions` is held. An empty list is vacuously satisfied.
pub fn has_all_permissions<C, P>(caller: Option<&C>, permissions: &[P]) -> bool
where
    C: Principal + ?Sized,
    P: AsRef<str>,
{
    permissions.iter().all(|p| has_permission(caller, p))
}

pub fn has_role<C: Principal + ?Sized>(caller: Option<&C>, role: &str) -> bool {
    caller_role(caller) == Some(role)
}

pub fn has_any_role<C, R>(caller: Option<&C>, roles: &[R]) -> bool
where
    C: Principal + ?Sized,
    R: AsRef<str>,
{
    match caller_role(caller) {
        Some(held) => roles.iter().any(|r| r.as_ref() == held),
        None => false,
    }
}

pub fn is_admin<C: Principal + ?Sized>(caller: Option<&C>) -> bool {
    has_role(caller, ADMIN)
}

/// The caller's full permission list, or nothing for absent/unknown roles.
pub fn get_user_permissions<C: Principal + ?Sized>(caller: Option<&C>) -> Vec<Permission> {
    caller_role(caller)
        .and_then(get_role_by_name)
        .map(|definition| definition.permissions.to_vec())
        .unwrap_or_default()
}
