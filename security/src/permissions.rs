// security/src/permissions.rs
//
// The closed permission catalog. A permission is a `resource:action` pair, but
// only the pairs listed in `ALL_PERMISSIONS` exist; everything else is unknown
// and never granted to a non-admin caller.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Things in the clinic a permission can be about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Patient,
    Doctor,
    Nurse,
    Room,
    HdMachine,
    Shift,
    HdSession,
    Diagnosis,
    Medication,
    HdProtocol,
    Complication,
    LabResult,
    User,
    Role,
    AuditLog,
    RuangInformasi,
}

impl Resource {
    pub const ALL: [Resource; 16] = [
        Resource::Patient,
        Resource::Doctor,
        Resource::Nurse,
        Resource::Room,
        Resource::HdMachine,
        Resource::Shift,
        Resource::HdSession,
        Resource::Diagnosis,
        Resource::Medication,
        Resource::HdProtocol,
        Resource::Complication,
        Resource::LabResult,
        Resource::User,
        Resource::Role,
        Resource::AuditLog,
        Resource::RuangInformasi,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Resource::Patient => "patient",
            Resource::Doctor => "doctor",
            Resource::Nurse => "nurse",
            Resource::Room => "room",
            Resource::HdMachine => "hd_machine",
            Resource::Shift => "shift",
            Resource::HdSession => "hd_session",
            Resource::Diagnosis => "diagnosis",
            Resource::Medication => "medication",
            Resource::HdProtocol => "hd_protocol",
            Resource::Complication => "complication",
            Resource::LabResult => "lab_result",
            Resource::User => "user",
            Resource::Role => "role",
            Resource::AuditLog => "audit_log",
            Resource::RuangInformasi => "ruang_informasi",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| PermissionParseError::new(s))
    }
}

/// What a permission allows doing to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
}

impl Action {
    pub const ALL: [Action; 5] = [Action::Create, Action::Read, Action::Update, Action::Delete, Action::Manage];

    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| PermissionParseError::new(s))
    }
}

/// Builds the canonical `"<resource>:<action>"` string for any pair, whether
/// or not the pair is in the catalog.
pub fn identifier(resource: Resource, action: Action) -> String {
    format!("{}:{}", resource.as_str(), action.as_str())
}

/// A string that does not name a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionParseError {
    pub input: String,
}

impl PermissionParseError {
    fn new(input: &str) -> Self {
        PermissionParseError { input: input.to_string() }
    }
}

impl fmt::Display for PermissionParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'{}' is not a known permission", self.input)
    }
}

impl std::error::Error for PermissionParseError {}

macro_rules! permission_catalog {
    ($( $variant:ident => ($resource:ident, $action:ident, $id:literal), )+) => {
        /// One grantable capability. Every variant is a member of the catalog.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Permission {
            $( $variant, )+
        }

        /// The whole catalog, in declaration order.
        pub const ALL_PERMISSIONS: &[Permission] = &[
            $( Permission::$variant, )+
        ];

        impl Permission {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Permission::$variant => $id, )+
                }
            }

            pub const fn resource(self) -> Resource {
                match self {
                    $( Permission::$variant => Resource::$resource, )+
                }
            }

            pub const fn action(self) -> Action {
                match self {
                    $( Permission::$variant => Action::$action, )+
                }
            }

            /// Exact catalog lookup. No wildcards, no case folding.
            pub fn lookup(id: &str) -> Option<Permission> {
                match id {
                    $( $id => Some(Permission::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

permission_catalog! {
    PatientCreate => (Patient, Create, "patient:create"),
    PatientRead => (Patient, Read, "patient:read"),
    PatientUpdate => (Patient, Update, "patient:update"),
    PatientDelete => (Patient, Delete, "patient:delete"),

    DoctorCreate => (Doctor, Create, "doctor:create"),
    DoctorRead => (Doctor, Read, "doctor:read"),
    DoctorUpdate => (Doctor, Update, "doctor:update"),
    DoctorDelete => (Doctor, Delete, "doctor:delete"),

    NurseCreate => (Nurse, Create, "nurse:create"),
    NurseRead => (Nurse, Read, "nurse:read"),
    NurseUpdate => (Nurse, Update, "nurse:update"),
    NurseDelete => (Nurse, Delete, "nurse:delete"),

    RoomCreate => (Room, Create, "room:create"),
    RoomRead => (Room, Read, "room:read"),
    RoomUpdate => (Room, Update, "room:update"),
    RoomDelete => (Room, Delete, "room:delete"),

    HdMachineCreate => (HdMachine, Create, "hd_machine:create"),
    HdMachineRead => (HdMachine, Read, "hd_machine:read"),
    HdMachineUpdate => (HdMachine, Update, "hd_machine:update"),
    HdMachineDelete => (HdMachine, Delete, "hd_machine:delete"),

    ShiftCreate => (Shift, Create, "shift:create"),
    ShiftRead => (Shift, Read, "shift:read"),
    ShiftUpdate => (Shift, Update, "shift:update"),
    ShiftDelete => (Shift, Delete, "shift:delete"),

    HdSessionCreate => (HdSession, Create, "hd_session:create"),
    HdSessionRead => (HdSession, Read, "hd_session:read"),
    HdSessionUpdate => (HdSession, Update, "hd_session:update"),
    HdSessionDelete => (HdSession, Delete, "hd_session:delete"),

    DiagnosisCreate => (Diagnosis, Create, "diagnosis:create"),
    DiagnosisRead => (Diagnosis, Read, "diagnosis:read"),
    DiagnosisUpdate => (Diagnosis, Update, "diagnosis:update"),
    DiagnosisDelete => (Diagnosis, Delete, "diagnosis:delete"),

    MedicationCreate => (Medication, Create, "medication:create"),
    MedicationRead => (Medication, Read, "medication:read"),
    MedicationUpdate => (Medication, Update, "medication:update"),
    MedicationDelete => (Medication, Delete, "medication:delete"),

    HdProtocolCreate => (HdProtocol, Create, "hd_protocol:create"),
    HdProtocolRead => (HdProtocol, Read, "hd_protocol:read"),
    HdProtocolUpdate => (HdProtocol, Update, "hd_protocol:update"),
    HdProtocolDelete => (HdProtocol, Delete, "hd_protocol:delete"),

    ComplicationCreate => (Complication, Create, "complication:create"),
    ComplicationRead => (Complication, Read, "complication:read"),
    ComplicationUpdate => (Complication, Update, "complication:update"),
    ComplicationDelete => (Complication, Delete, "complication:delete"),

    LabResultCreate => (LabResult, Create, "lab_result:create"),
    LabResultRead => (LabResult, Read, "lab_result:read"),
    LabResultUpdate => (LabResult, Update, "lab_result:update"),
    LabResultDelete => (LabResult, Delete, "lab_result:delete"),

    UserCreate => (User, Create, "user:create"),
    UserRead => (User, Read, "user:read"),
    UserUpdate => (User, Update, "user:update"),
    UserDelete => (User, Delete, "user:delete"),
    UserManage => (User, Manage, "user:manage"),

    RoleRead => (Role, Read, "role:read"),
    RoleManage => (Role, Manage, "role:manage"),

    AuditLogRead => (AuditLog, Read, "audit_log:read"),

    RuangInformasiCreate => (RuangInformasi, Create, "ruang_informasi:create"),
    RuangInformasiRead => (RuangInformasi, Read, "ruang_informasi:read"),
    RuangInformasiUpdate => (RuangInformasi, Update, "ruang_informasi:update"),
    RuangInformasiDelete => (RuangInformasi, Delete, "ruang_informasi:delete"),
}

impl Permission {
    /// `None` when the pair is not part of the catalog (e.g. `audit_log:delete`).
    pub fn from_parts(resource: Resource, action: Action) -> Option<Permission> {
        ALL_PERMISSIONS
            .iter()
            .copied()
            .find(|p| p.resource() == resource && p.action() == action)
    }
}

/// Catalog membership for a raw identifier.
pub fn is_known_permission(id: &str) -> bool {
    Permission::lookup(id).is_some()
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::lookup(s).ok_or_else(|| PermissionParseError::new(s))
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
