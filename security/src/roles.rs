// security/src/roles.rs
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use models::Identifier;
use models::medical::RoleRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::permissions::{ALL_PERMISSIONS, Permission, is_known_permission};
use crate::permissions::Permission::*;

/// A built-in role and the permissions it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub permissions: &'static [Permission],
}

impl RoleDefinition {
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

pub const ADMIN: &str = "admin";
pub const DOKTER: &str = "dokter";
pub const PERAWAT: &str = "perawat";
pub const PASIEN: &str = "pasien";
pub const EDUKATOR: &str = "edukator";

const DOKTER_PERMISSIONS: &[Permission] = &[
    PatientRead,
    PatientUpdate,
    DoctorRead,
    NurseRead,
    RoomRead,
    HdMachineRead,
    ShiftRead,
    HdSessionRead,
    HdSessionUpdate,
    DiagnosisCreate,
    DiagnosisRead,
    DiagnosisUpdate,
    DiagnosisDelete,
    MedicationCreate,
    MedicationRead,
    MedicationUpdate,
    MedicationDelete,
    HdProtocolCreate,
    HdProtocolRead,
    HdProtocolUpdate,
    HdProtocolDelete,
    ComplicationCreate,
    ComplicationRead,
    ComplicationUpdate,
    LabResultCreate,
    LabResultRead,
    RuangInformasiRead,
];

const PERAWAT_PERMISSIONS: &[Permission] = &[
    PatientCreate,
    PatientRead,
    PatientUpdate,
    DoctorRead,
    NurseRead,
    RoomRead,
    HdMachineRead,
    HdMachineUpdate,
    ShiftRead,
    HdSessionCreate,
    HdSessionRead,
    HdSessionUpdate,
    DiagnosisRead,
    MedicationRead,
    HdProtocolRead,
    ComplicationCreate,
    ComplicationRead,
    ComplicationUpdate,
    LabResultCreate,
    LabResultRead,
    RuangInformasiRead,
];

const PASIEN_PERMISSIONS: &[Permission] = &[
    PatientRead,
    ShiftRead,
    HdSessionRead,
    LabResultRead,
    RuangInformasiRead,
];

const EDUKATOR_PERMISSIONS: &[Permission] = &[
    PatientRead,
    RuangInformasiCreate,
    RuangInformasiRead,
    RuangInformasiUpdate,
    RuangInformasiDelete,
];

/// The fixed role table. Admin carries the whole catalog by construction.
pub static ROLES: &[RoleDefinition] = &[
    RoleDefinition {
        name: ADMIN,
        display_name: "Administrator",
        description: "Full access to every clinic module, user accounts and role settings",
        permissions: ALL_PERMISSIONS,
    },
    RoleDefinition {
        name: DOKTER,
        display_name: "Dokter",
        description: "Nephrologists: diagnoses, prescriptions, dialysis protocols and complications",
        permissions: DOKTER_PERMISSIONS,
    },
    RoleDefinition {
        name: PERAWAT,
        display_name: "Perawat",
        description: "Dialysis nurses: patient intake, session monitoring, machines and complications",
        permissions: PERAWAT_PERMISSIONS,
    },
    RoleDefinition {
        name: PASIEN,
        display_name: "Pasien",
        description: "Patients: their own record, schedule, sessions and lab results",
        permissions: PASIEN_PERMISSIONS,
    },
    RoleDefinition {
        name: EDUKATOR,
        display_name: "Edukator",
        description: "Educators: maintain the public information area",
        permissions: EDUKATOR_PERMISSIONS,
    },
];

lazy_static! {
    static ref ROLE_INDEX: HashMap<&'static str, &'static RoleDefinition> =
        ROLES.iter().map(|role| (role.name, role)).collect();
}

/// Exact, case-sensitive lookup. `None` must be treated as "no permissions".
pub fn get_role_by_name(name: &str) -> Option<&'static RoleDefinition> {
    ROLE_INDEX.get(name).copied()
}

pub fn all_roles() -> &'static [RoleDefinition] {
    ROLES
}

/// The five built-in roles as a closed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinRole {
    Admin,
    Dokter,
    Perawat,
    Pasien,
    Edukator,
}

impl BuiltinRole {
    pub const ALL: [BuiltinRole; 5] = [
        BuiltinRole::Admin,
        BuiltinRole::Dokter,
        BuiltinRole::Perawat,
        BuiltinRole::Pasien,
        BuiltinRole::Edukator,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BuiltinRole::Admin => ADMIN,
            BuiltinRole::Dokter => DOKTER,
            BuiltinRole::Perawat => PERAWAT,
            BuiltinRole::Pasien => PASIEN,
            BuiltinRole::Edukator => EDUKATOR,
        }
    }

    pub fn definition(self) -> &'static RoleDefinition {
        match self {
            BuiltinRole::Admin => &ROLES[0],
            BuiltinRole::Dokter => &ROLES[1],
            BuiltinRole::Perawat => &ROLES[2],
            BuiltinRole::Pasien => &ROLES[3],
            BuiltinRole::Edukator => &ROLES[4],
        }
    }
}

impl fmt::Display for BuiltinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that is not one of the built-in roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}' is not a built-in role", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for BuiltinRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinRole::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

// --- Role records from the settings screens ---

/// Role rows exported from the settings screens, as YAML:
///
/// ```yaml
/// roles:
///   - name: perawat
///     display_name: Perawat
///     permissions: ["patient:read", "hd_session:create"]
/// ```
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RolesConfig {
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
    #[serde(skip)]
    name_map: HashMap<Identifier, usize>,
}

/// A difference between a role record and the built-in role table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleDrift {
    /// The record names a role the checks do not know; holders get no access.
    UnmappedRole { role: String },
    /// The record lists a string outside the permission catalog.
    UnknownPermission { role: String, permission: String },
    /// A built-in role whose record disagrees with the table.
    PermissionMismatch {
        role: String,
        missing_from_record: Vec<Permission>,
        extra_in_record: Vec<Permission>,
    },
}

impl fmt::Display for RoleDrift {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RoleDrift::UnmappedRole { role } => {
                write!(f, "role '{}' is not a built-in role and grants no access", role)
            }
            RoleDrift::UnknownPermission { role, permission } => {
                write!(f, "role '{}' lists unknown permission '{}'", role, permission)
            }
            RoleDrift::PermissionMismatch { role, missing_from_record, extra_in_record } => write!(
                f,
                "role '{}' differs from the built-in table (record lacks {}, record adds {})",
                role,
                join_permissions(missing_from_record),
                join_permissions(extra_in_record)
            ),
        }
    }
}

fn join_permissions(permissions: &[Permission]) -> String {
    if permissions.is_empty() {
        return "nothing".to_string();
    }
    permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
}

impl RolesConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut config: RolesConfig = serde_yaml::from_str(content).context("Failed to parse role records")?;
        config.name_map = config
            .roles
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.name.clone(), idx))
            .collect();
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read role records from {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("Invalid role records in {}", path.display()))
    }

    pub fn get_record(&self, name: &str) -> Option<&RoleRecord> {
        let key = Identifier::from_str(name).ok()?;
        self.name_map.get(&key).map(|&idx| &self.roles[idx])
    }

    /// Compares every record with the built-in table. Nothing is changed on
    /// either side; the result is for operators to act on.
    pub fn audit(&self) -> Vec<RoleDrift> {
        let mut drifts = Vec::new();
        for record in &self.roles {
            let role = record.name.to_string();
            let mut listed = BTreeSet::new();
            for raw in &record.permissions {
                match Permission::lookup(raw) {
                    Some(p) => {
                        listed.insert(p);
                    }
                    None => drifts.push(RoleDrift::UnknownPermission {
                        role: role.clone(),
                        permission: raw.clone(),
                    }),
                }
            }

            let Some(builtin) = get_role_by_name(&role) else {
                drifts.push(RoleDrift::UnmappedRole { role });
                continue;
            };
            let expected: BTreeSet<Permission> = builtin.permissions.iter().copied().collect();
            if expected != listed {
                drifts.push(RoleDrift::PermissionMismatch {
                    role,
                    missing_from_record: expected.difference(&listed).copied().collect(),
                    extra_in_record: listed.difference(&expected).copied().collect(),
                });
            }
        }
        drifts
    }

    /// Records whose shape is invalid against the catalog, with the reason.
    pub fn invalid_records(&self) -> Vec<(String, models::ValidationError)> {
        self.roles
            .iter()
            .filter_map(|r| r.validate_with(is_known_permission).err().map(|e| (r.name.to_string(), e)))
            .collect()
    }
}
