pub mod client;
pub mod config;
pub mod contract;
pub mod logging;
pub mod model;
pub mod retry;

pub use client::{ClientSettings, UpstreamClient};
pub use model::{DepartmentId, Employee, EmployeesListing, ErrorBody, NewEmployee};
pub use retry::UpstreamError;
