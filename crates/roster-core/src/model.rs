//! Wire model shared by the client and the provider.
//!
//! Field names follow the provider's JSON contract (camelCase). Every field
//! of [`Employee`] is optional on the wire so that schema-violating provider
//! responses still decode; use [`crate::contract`] to check them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier scoping a collection of employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(Uuid);

impl DepartmentId {
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for DepartmentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Employee as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Assigned by the provider on creation; never set by a caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Uuid>,
}

/// Employee as submitted by a caller. Carries no identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
}

impl NewEmployee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: email.into(),
        }
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }
}

/// Listing body of `GET .../employees`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeesListing {
    pub employees: Vec<Employee>,
}

/// Error body the provider returns with any non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn department_id_parses_and_displays_hyphenated() {
        let id: DepartmentId = "6A7E41B9-CACF-44F4-95B7-AF1FDD60F3C8".parse().unwrap();
        assert_eq!(id.to_string(), "6a7e41b9-cacf-44f4-95b7-af1fdd60f3c8");
        assert!("not-a-uuid".parse::<DepartmentId>().is_err());
    }

    #[test]
    fn new_employee_never_serializes_an_identifier() {
        let emp = NewEmployee::new("michelle.yeoh@goat.com").first_name("Michelle");
        let json = serde_json::to_value(&emp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "firstName": "Michelle", "email": "michelle.yeoh@goat.com" })
        );
    }

    #[test]
    fn employee_tolerates_missing_email() {
        let emp: Employee = serde_json::from_str(
            r#"{"firstName":"Robin","lastName":"Doe","employeeId":"faaaf9e7-dfa7-4561-97a5-21756290383a"}"#,
        )
        .unwrap();
        assert!(emp.email.is_none());
        assert_eq!(emp.last_name.as_deref(), Some("Doe"));
        assert!(emp.employee_id.is_some());
    }

    #[test]
    fn listing_uses_employees_key() {
        let listing: EmployeesListing =
            serde_json::from_str(r#"{"employees":[{"email":"a@b.c"}]}"#).unwrap();
        assert_eq!(listing.employees.len(), 1);
        assert_eq!(listing.employees[0].email.as_deref(), Some("a@b.c"));
    }
}
