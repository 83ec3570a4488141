//! HTTP routes of the fault-injection provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use roster_core::model::{DepartmentId, Employee, EmployeesListing, NewEmployee};
use serde_json::{json, Value};

use crate::error::ProviderError;
use crate::faults::FaultTable;

/// Route of the department-scoped employee collection.
pub const EMPLOYEES_ROUTE: &str = "/demo-service/v1/departments/:department_id/employees";

/// Shared, immutable provider state plus a request counter.
#[derive(Debug, Default)]
pub struct ProviderState {
    table: FaultTable,
    requests: AtomicUsize,
}

impl ProviderState {
    pub fn new(table: FaultTable) -> Self {
        Self {
            table,
            requests: AtomicUsize::new(0),
        }
    }

    /// Employee requests served so far, failures included.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn record(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn router(state: Arc<ProviderState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(EMPLOYEES_ROUTE, get(list_employees).post(create_employee))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn department(path: Result<Path<DepartmentId>, PathRejection>) -> Result<DepartmentId, ProviderError> {
    path.map(|Path(id)| id)
        .map_err(|e| ProviderError::bad_request(format!("invalid department id: {}", e.body_text())))
}

async fn list_employees(
    State(state): State<Arc<ProviderState>>,
    path: Result<Path<DepartmentId>, PathRejection>,
) -> Result<Json<EmployeesListing>, ProviderError> {
    state.record();
    let department = department(path)?;
    match state.table.list_employees(&department) {
        Ok(employees) => {
            tracing::info!(%department, count = employees.len(), "listing served");
            Ok(Json(EmployeesListing { employees }))
        }
        Err(e) => {
            tracing::warn!(%department, status = e.status, "listing rejected: {}", e.message);
            Err(e)
        }
    }
}

async fn create_employee(
    State(state): State<Arc<ProviderState>>,
    path: Result<Path<DepartmentId>, PathRejection>,
    body: Result<Json<NewEmployee>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), ProviderError> {
    state.record();
    let department = department(path)?;
    let Json(new_employee) =
        body.map_err(|e| ProviderError::bad_request(format!("invalid employee: {}", e.body_text())))?;
    match state.table.create_employee(&department, new_employee) {
        Ok(created) => {
            tracing::info!(%department, employee_id = ?created.employee_id, "employee created");
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(e) => {
            tracing::warn!(%department, status = e.status, "create rejected: {}", e.message);
            Err(e)
        }
    }
}
