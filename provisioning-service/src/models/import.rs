//! Import batch types: rows in, per-row results out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenantRole;

/// Hard cap on rows per batch; bounds worst-case identity-listing cost and
/// keeps a commit within a single request's time budget.
pub const MAX_BATCH_ROWS: usize = 500;

/// Human-facing row numbers are offset past the CSV header line, so the first
/// data row reports as row 2.
pub const ROW_NUMBER_OFFSET: usize = 2;

/// Batch execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    DryRun,
    Commit,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::DryRun => "dry_run",
            ImportMode::Commit => "commit",
        }
    }
}

/// One record as supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRowRequest {
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

/// Bulk import request body.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub mode: ImportMode,
    pub rows: Vec<ImportRowRequest>,
    pub reason: Option<String>,
}

/// One import row, positioned within the caller's original list.
/// `row_number` is presentation-only and never persisted.
#[derive(Debug, Clone)]
pub struct ImportRow {
    pub row_number: usize,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

impl ImportRow {
    /// Attach the human-facing row number to a request record at list index
    /// `index`.
    pub fn from_request(index: usize, req: ImportRowRequest) -> Self {
        Self {
            row_number: index + ROW_NUMBER_OFFSET,
            email: req.email,
            password: req.password,
            roles: req.roles,
            display_name: req.display_name,
            phone: req.phone,
        }
    }
}

/// Per-row outcome, advanced in place as the row moves through commit steps.
#[derive(Debug, Clone, Serialize)]
pub struct RowResult {
    pub row_number: usize,
    pub email: String,
    pub ok: bool,
    pub errors: Vec<String>,
    pub normalized_roles: Vec<TenantRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl RowResult {
    /// Mark the row failed with the given error, discarding any earlier
    /// success state.
    pub fn fail(&mut self, error: String) {
        self.ok = false;
        self.errors.push(error);
    }
}

/// Aggregated batch response.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub ok: bool,
    pub mode: ImportMode,
    pub results: Vec<RowResult>,
}
