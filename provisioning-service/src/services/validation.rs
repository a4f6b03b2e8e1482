//! Row validation: pure, deterministic, no I/O.
//!
//! Every rule is evaluated and errors accumulate; nothing short-circuits.
//! Commit re-runs this over the whole batch rather than trusting an earlier
//! dry-run, since rows or the allow-list may have changed between calls.

use crate::models::{normalize_roles, ImportRow, RowResult};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_DISPLAY_NAME_LEN: usize = 120;
const MAX_PHONE_LEN: usize = 50;

/// Validate one import row. `user_id` stays unset; commit fills it in later.
pub fn validate_row(row: &ImportRow) -> RowResult {
    let mut errors = Vec::new();

    let email = row.email.trim();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !email.contains('@') {
        errors.push("Invalid email address".to_string());
    }

    if row.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("Password must be at least 8 characters".to_string());
    }

    let (normalized_roles, unknown) = normalize_roles(&row.roles);
    if normalized_roles.is_empty() && unknown.is_empty() {
        errors.push("At least one role is required".to_string());
    }
    for name in unknown {
        errors.push(format!("Unknown role: {}", name));
    }

    if let Some(name) = &row.display_name {
        if name.chars().count() > MAX_DISPLAY_NAME_LEN {
            errors.push("Display name must be 120 characters or fewer".to_string());
        }
    }

    if let Some(phone) = &row.phone {
        if phone.chars().count() > MAX_PHONE_LEN {
            errors.push("Phone must be 50 characters or fewer".to_string());
        }
    }

    RowResult {
        row_number: row.row_number,
        email: email.to_string(),
        ok: errors.is_empty(),
        errors,
        normalized_roles,
        user_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenantRole;

    fn row(email: &str, password: &str, roles: &[&str]) -> ImportRow {
        ImportRow {
            row_number: 2,
            email: email.to_string(),
            password: password.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            display_name: None,
            phone: None,
        }
    }

    #[test]
    fn valid_row_passes() {
        let result = validate_row(&row("t@school.example", "password123", &["teacher"]));
        assert!(result.ok);
        assert!(result.errors.is_empty());
        assert_eq!(result.normalized_roles, vec![TenantRole::Teacher]);
        assert!(result.user_id.is_none());
    }

    #[test]
    fn seven_char_password_reports_exact_message() {
        let result = validate_row(&row("t@school.example", "1234567", &["teacher"]));
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec!["Password must be at least 8 characters".to_string()]
        );
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        // Seven multibyte characters span fourteen bytes; still too short.
        let result = validate_row(&row("t@school.example", "ñññññññ", &["teacher"]));
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec!["Password must be at least 8 characters".to_string()]
        );

        let result = validate_row(&row("t@school.example", "ññññññññ", &["teacher"]));
        assert!(result.ok);
    }

    #[test]
    fn empty_email_and_missing_at_are_distinct_errors() {
        let result = validate_row(&row("", "password123", &["teacher"]));
        assert_eq!(result.errors, vec!["Email is required".to_string()]);

        let result = validate_row(&row("not-an-email", "password123", &["teacher"]));
        assert_eq!(result.errors, vec!["Invalid email address".to_string()]);
    }

    #[test]
    fn errors_accumulate_without_short_circuit() {
        let result = validate_row(&row("", "short", &[]));
        assert_eq!(
            result.errors,
            vec![
                "Email is required".to_string(),
                "Password must be at least 8 characters".to_string(),
                "At least one role is required".to_string(),
            ]
        );
    }

    #[test]
    fn unknown_roles_are_named_individually() {
        let result = validate_row(&row(
            "t@school.example",
            "password123",
            &["teacher", "wizard", "janitor"],
        ));
        assert!(!result.ok);
        assert_eq!(
            result.errors,
            vec![
                "Unknown role: wizard".to_string(),
                "Unknown role: janitor".to_string(),
            ]
        );
        assert_eq!(result.normalized_roles, vec![TenantRole::Teacher]);
    }

    #[test]
    fn duplicate_roles_collapse_before_validation() {
        let result = validate_row(&row(
            "t@school.example",
            "password123",
            &["teacher", "teacher"],
        ));
        assert!(result.ok);
        assert_eq!(result.normalized_roles, vec![TenantRole::Teacher]);
    }

    #[test]
    fn long_optional_fields_are_rejected() {
        let mut long_name = row("t@school.example", "password123", &["teacher"]);
        long_name.display_name = Some("x".repeat(121));
        assert_eq!(
            validate_row(&long_name).errors,
            vec!["Display name must be 120 characters or fewer".to_string()]
        );

        let mut long_phone = row("t@school.example", "password123", &["teacher"]);
        long_phone.phone = Some("9".repeat(51));
        assert_eq!(
            validate_row(&long_phone).errors,
            vec!["Phone must be 50 characters or fewer".to_string()]
        );

        let mut at_limit = row("t@school.example", "password123", &["teacher"]);
        at_limit.display_name = Some("x".repeat(120));
        at_limit.phone = Some("9".repeat(50));
        assert!(validate_row(&at_limit).ok);
    }

    #[test]
    fn dry_run_and_commit_see_identical_results() {
        // Same pure function both times; byte-identical output.
        let input = row("t@school.example", "1234567", &["teacher", "wizard"]);
        let first = validate_row(&input);
        let second = validate_row(&input);
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.normalized_roles, second.normalized_roles);
        assert_eq!(first.ok, second.ok);
    }
}
