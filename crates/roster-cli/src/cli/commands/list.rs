//! `roster list <department>` – list employees of a department.

use anyhow::{Context, Result};
use roster_core::client::UpstreamClient;
use roster_core::config::RosterConfig;
use roster_core::contract::check_listing;
use roster_core::model::DepartmentId;

use super::{employee_row, print_header, report_violations};

pub async fn run_list(cfg: &RosterConfig, department: DepartmentId, check: bool) -> Result<()> {
    let client = UpstreamClient::new(cfg.client_settings())?;
    let employees = tokio::task::spawn_blocking(move || client.list_employees(&department))
        .await?
        .with_context(|| format!("list employees of department {department}"))?;

    print_header();
    for e in &employees {
        println!("{}", employee_row(e));
    }
    if check {
        report_violations(&check_listing(&employees))?;
    }
    Ok(())
}
