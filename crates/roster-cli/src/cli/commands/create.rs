//! `roster create <department> --email ...` – create an employee.

use anyhow::{Context, Result};
use roster_core::client::UpstreamClient;
use roster_core::config::RosterConfig;
use roster_core::contract::check_employee;
use roster_core::model::{DepartmentId, NewEmployee};

use super::{employee_row, print_header, report_violations};

#[derive(Debug, Clone)]
pub struct CreateArgs {
    pub department: DepartmentId,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub check: bool,
}

impl CreateArgs {
    pub fn new_employee(&self) -> NewEmployee {
        NewEmployee {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

pub async fn run_create(cfg: &RosterConfig, args: CreateArgs) -> Result<()> {
    let client = UpstreamClient::new(cfg.client_settings())?;
    let department = args.department;
    let new_employee = args.new_employee();
    let created =
        tokio::task::spawn_blocking(move || client.create_employee(&department, &new_employee))
            .await?
            .with_context(|| format!("create employee in department {department}"))?;

    print_header();
    println!("{}", employee_row(&created));
    if args.check {
        report_violations(&check_employee(&created))?;
    }
    Ok(())
}
