//! Tenant role allow-list.
//!
//! The set of roles a tenant may grant is closed: imports naming anything
//! outside this enum are rejected row by row, with each unknown name called
//! out individually.

use serde::{Deserialize, Serialize};

/// A role grantable within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantRole {
    SuperAdmin,
    Owner,
    Principal,
    VicePrincipal,
    AcademicCoordinator,
    Teacher,
    Accountant,
    HrManager,
    Counselor,
    Student,
    Parent,
    MarketingStaff,
}

/// Roles allowed to provision accounts for their tenant.
pub const PRIVILEGED_ROLES: &[TenantRole] = &[
    TenantRole::SuperAdmin,
    TenantRole::Owner,
    TenantRole::Principal,
    TenantRole::VicePrincipal,
    TenantRole::HrManager,
];

impl TenantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantRole::SuperAdmin => "super_admin",
            TenantRole::Owner => "owner",
            TenantRole::Principal => "principal",
            TenantRole::VicePrincipal => "vice_principal",
            TenantRole::AcademicCoordinator => "academic_coordinator",
            TenantRole::Teacher => "teacher",
            TenantRole::Accountant => "accountant",
            TenantRole::HrManager => "hr_manager",
            TenantRole::Counselor => "counselor",
            TenantRole::Student => "student",
            TenantRole::Parent => "parent",
            TenantRole::MarketingStaff => "marketing_staff",
        }
    }

    /// Parse a role name. Input is trimmed and lowercased first.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Some(TenantRole::SuperAdmin),
            "owner" => Some(TenantRole::Owner),
            "principal" => Some(TenantRole::Principal),
            "vice_principal" => Some(TenantRole::VicePrincipal),
            "academic_coordinator" => Some(TenantRole::AcademicCoordinator),
            "teacher" => Some(TenantRole::Teacher),
            "accountant" => Some(TenantRole::Accountant),
            "hr_manager" => Some(TenantRole::HrManager),
            "counselor" => Some(TenantRole::Counselor),
            "student" => Some(TenantRole::Student),
            "parent" => Some(TenantRole::Parent),
            "marketing_staff" => Some(TenantRole::MarketingStaff),
            _ => None,
        }
    }

    pub fn is_privileged(&self) -> bool {
        PRIVILEGED_ROLES.contains(self)
    }
}

/// Normalize a raw role list: trim, lowercase, drop duplicates (first
/// occurrence wins), and split into known roles and unknown names.
pub fn normalize_roles(raw: &[String]) -> (Vec<TenantRole>, Vec<String>) {
    let mut seen: Vec<String> = Vec::new();
    let mut known = Vec::new();
    let mut unknown = Vec::new();

    for role in raw {
        let name = role.trim().to_lowercase();
        if name.is_empty() || seen.contains(&name) {
            continue;
        }
        seen.push(name.clone());
        match TenantRole::parse(&name) {
            Some(r) => known.push(r),
            None => unknown.push(name),
        }
    }

    (known, unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_allow_listed_role() {
        for name in [
            "super_admin",
            "owner",
            "principal",
            "vice_principal",
            "academic_coordinator",
            "teacher",
            "accountant",
            "hr_manager",
            "counselor",
            "student",
            "parent",
            "marketing_staff",
        ] {
            let role = TenantRole::parse(name).expect(name);
            assert_eq!(role.as_str(), name);
        }
    }

    #[test]
    fn parse_rejects_unknown_role() {
        assert!(TenantRole::parse("janitor").is_none());
        assert!(TenantRole::parse("").is_none());
    }

    #[test]
    fn parse_is_case_and_whitespace_insensitive() {
        assert_eq!(TenantRole::parse(" Teacher "), Some(TenantRole::Teacher));
        assert_eq!(TenantRole::parse("HR_MANAGER"), Some(TenantRole::HrManager));
    }

    #[test]
    fn normalize_collapses_duplicates_keeping_first_occurrence_order() {
        let raw = vec![
            "teacher".to_string(),
            "teacher".to_string(),
            "student".to_string(),
            "Teacher".to_string(),
        ];
        let (known, unknown) = normalize_roles(&raw);
        assert_eq!(known, vec![TenantRole::Teacher, TenantRole::Student]);
        assert!(unknown.is_empty());
    }

    #[test]
    fn normalize_names_each_unknown_role_once() {
        let raw = vec![
            "teacher".to_string(),
            "wizard".to_string(),
            "wizard".to_string(),
            "janitor".to_string(),
        ];
        let (known, unknown) = normalize_roles(&raw);
        assert_eq!(known, vec![TenantRole::Teacher]);
        assert_eq!(unknown, vec!["wizard".to_string(), "janitor".to_string()]);
    }

    #[test]
    fn privileged_subset() {
        assert!(TenantRole::Owner.is_privileged());
        assert!(TenantRole::HrManager.is_privileged());
        assert!(!TenantRole::Teacher.is_privileged());
        assert!(!TenantRole::Parent.is_privileged());
    }
}
