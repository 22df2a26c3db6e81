// security/tests/authorization_properties.rs
use std::collections::HashSet;

use models::medical::{NewUser, User};
use models::Caller;
use security::roles::{ADMIN, DOKTER, EDUKATOR, PASIEN, PERAWAT};
use security::{
    ALL_PERMISSIONS, Permission, get_role_by_name, get_user_permissions, has_all_permissions, has_any_permission,
    has_any_role, has_permission, has_role, is_admin,
};

const BUILTIN: [&str; 5] = [ADMIN, DOKTER, PERAWAT, PASIEN, EDUKATOR];

fn as_caller(role: &str) -> Caller {
    Caller::with_role(role)
}

#[test]
fn every_role_is_a_subset_of_the_catalog() {
    let catalog: HashSet<Permission> = ALL_PERMISSIONS.iter().copied().collect();
    for name in BUILTIN {
        let role = get_role_by_name(name).unwrap();
        let granted: HashSet<Permission> = role.permissions.iter().copied().collect();
        assert!(granted.is_subset(&catalog), "{} exceeds the catalog", name);
        if name == ADMIN {
            assert_eq!(granted, catalog);
        } else {
            assert!(granted.len() < catalog.len(), "{} should not hold everything", name);
        }
    }
}

#[test]
fn admin_holds_every_catalog_permission() {
    let admin = as_caller(ADMIN);
    assert!(ALL_PERMISSIONS.iter().all(|p| has_permission(Some(&admin), p.as_str())));
    assert!(has_all_permissions(Some(&admin), ALL_PERMISSIONS));
    assert!(is_admin(Some(&admin)));
}

#[test]
fn patient_never_holds_administrative_permissions() {
    let pasien = as_caller(PASIEN);
    assert!(!has_permission(Some(&pasien), "user:delete"));
    assert!(!has_any_permission(
        Some(&pasien),
        &["user:create", "user:update", "user:delete", "user:manage", "role:manage", "audit_log:read"]
    ));
}

#[test]
fn absent_or_unknown_callers_are_denied() {
    let nobody: Option<&Caller> = None;
    assert!(!has_permission(nobody, "patient:read"));
    assert!(!has_permission(Some(&Caller::anonymous()), "patient:read"));
    assert!(!has_permission(Some(&as_caller("nonexistent_role")), "patient:read"));
    assert!(!has_permission(Some(&as_caller("ADMIN")), "patient:read"));
}

#[test]
fn empty_role_names_match_nothing() {
    let blank = as_caller("");
    assert!(!has_role(Some(&blank), ""));
    assert!(!has_any_role(Some(&blank), &[""]));
    assert!(!is_admin(Some(&blank)));
    assert!(get_user_permissions(Some(&blank)).is_empty());

    let mut user = User::from_new_user(NewUser {
        name: "Rina".to_string(),
        username: "rina".to_string(),
        email: "rina@example.com".to_string(),
        phone: None,
        role: Some(PERAWAT.to_string()),
    })
    .unwrap();
    user.assign_role(Some(String::new()));
    assert!(!has_role(Some(&user), ""));
    assert!(!has_any_role(Some(&user), &[""]));
    assert!(!has_permission(Some(&user), "patient:read"));
}

#[test]
fn doctor_any_versus_all() {
    let dokter = as_caller(DOKTER);
    let requested = ["patient:delete", "diagnosis:create"];
    assert!(has_any_permission(Some(&dokter), &requested));
    assert!(!has_all_permissions(Some(&dokter), &requested));
}

#[test]
fn nurse_permissions_match_the_table() {
    let perawat = as_caller(PERAWAT);
    let listed = get_user_permissions(Some(&perawat));
    let unique: HashSet<Permission> = listed.iter().copied().collect();
    assert_eq!(unique.len(), listed.len());

    let expected: HashSet<Permission> = get_role_by_name(PERAWAT).unwrap().permissions.iter().copied().collect();
    assert_eq!(unique, expected);
    assert!(unique.contains(&Permission::HdSessionCreate));
    assert!(!unique.contains(&Permission::DiagnosisCreate));
}

#[test]
fn educator_only_edits_the_information_area() {
    let edukator = as_caller(EDUKATOR);
    for p in get_user_permissions(Some(&edukator)) {
        if p.action() != security::Action::Read {
            assert_eq!(p.resource(), security::Resource::RuangInformasi, "{}", p);
        }
    }
}

#[test]
fn checks_are_idempotent() {
    let dokter = as_caller(DOKTER);
    let first = (
        has_permission(Some(&dokter), "hd_protocol:update"),
        get_user_permissions(Some(&dokter)),
    );
    for _ in 0..100 {
        assert_eq!(has_permission(Some(&dokter), "hd_protocol:update"), first.0);
        assert_eq!(get_user_permissions(Some(&dokter)), first.1);
    }
}

#[test]
fn stored_users_are_principals() {
    let user = User::from_new_user(NewUser {
        name: "Budi Santoso".to_string(),
        username: "budi".to_string(),
        email: "budi@example.com".to_string(),
        phone: Some("08123456789".to_string()),
        role: Some(PASIEN.to_string()),
    })
    .unwrap();
    assert!(has_permission(Some(&user), Permission::LabResultRead));
    assert!(!has_permission(Some(&user), Permission::LabResultCreate));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn checks_run_concurrently_without_contention() {
    let handles: Vec<_> = BUILTIN
        .into_iter()
        .map(|name| {
            tokio::spawn(async move {
                let caller = as_caller(name);
                (0..1_000).all(|_| has_permission(Some(&caller), "patient:read"))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap());
    }
}
