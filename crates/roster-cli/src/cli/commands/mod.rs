//! CLI command handlers, one per file.

mod create;
mod list;
mod serve;

pub use create::{run_create, CreateArgs};
pub use list::run_list;
pub use serve::run_serve;

use anyhow::{bail, Result};
use roster_core::contract::Violation;
use roster_core::model::Employee;

/// One table row; absent fields render as `-`.
pub(crate) fn employee_row(e: &Employee) -> String {
    let id = e
        .employee_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<36}  {:<12} {:<12} {}",
        id,
        e.first_name.as_deref().unwrap_or("-"),
        e.last_name.as_deref().unwrap_or("-"),
        e.email.as_deref().unwrap_or("-"),
    )
}

pub(crate) fn print_header() {
    println!("{:<36}  {:<12} {:<12} {}", "ID", "FIRST", "LAST", "EMAIL");
}

/// Print contract violations and fail if there are any.
pub(crate) fn report_violations(violations: &[Violation]) -> Result<()> {
    if violations.is_empty() {
        println!("contract: ok");
        return Ok(());
    }
    for v in violations {
        println!("contract: {v}");
    }
    bail!("response violates the contract ({} violations)", violations.len())
}
