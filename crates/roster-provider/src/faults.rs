//! Deterministic fault table.
//!
//! Maps reserved department ids and submitted email addresses to behaviors.
//! Anything not in the table behaves normally.

use std::collections::HashMap;

use roster_core::model::{DepartmentId, Employee, NewEmployee};
use uuid::{uuid, Uuid};

use crate::error::ProviderError;

/// Listing returns one employee without an email.
pub const INVALID_DEPARTMENT: DepartmentId =
    DepartmentId::from_uuid(uuid!("faaaf9e7-dfa7-4561-97a5-21756290383a"));
/// Department that does not exist: 404 on every operation.
pub const UNKNOWN_DEPARTMENT: DepartmentId =
    DepartmentId::from_uuid(uuid!("3535c952-1c46-4cc7-9908-c4a3a1e5c597"));
/// Listing fails with 400.
pub const BAD_REQUEST_DEPARTMENT: DepartmentId =
    DepartmentId::from_uuid(uuid!("00d6e488-7552-48e6-a082-47d059c77ee2"));

/// Creating an employee with this email fails with 400.
pub const KNOWN_EMAIL: &str = "user@known.com";
/// Creating an employee with this email succeeds but drops the email.
pub const DROPPED_EMAIL: &str = "user@dropped.com";

/// What the provider does for a matching request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    /// Normal, schema-conforming response.
    Succeed,
    /// Successful response with the email field stripped from one employee
    /// (the last one of a listing, the created one on create).
    DropEmail,
    /// Error response.
    Reject { status: u16, message: String },
}

impl Behavior {
    pub fn reject(status: u16, message: impl Into<String>) -> Self {
        Behavior::Reject {
            status,
            message: message.into(),
        }
    }
}

/// Lookup tables driving the fault-injection provider.
#[derive(Debug, Clone, Default)]
pub struct FaultTable {
    listing: HashMap<DepartmentId, Behavior>,
    create_by_department: HashMap<DepartmentId, Behavior>,
    create_by_email: HashMap<String, Behavior>,
}

impl FaultTable {
    /// Empty table: every request succeeds.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the well-known fixtures.
    pub fn standard() -> Self {
        let not_found = Behavior::reject(404, "Department Id not found");
        Self::empty()
            .with_listing(INVALID_DEPARTMENT, Behavior::DropEmail)
            .with_listing(UNKNOWN_DEPARTMENT, not_found.clone())
            .with_listing(
                BAD_REQUEST_DEPARTMENT,
                Behavior::reject(400, "Never liked that department anyway"),
            )
            .with_create_department(UNKNOWN_DEPARTMENT, not_found)
            .with_email(KNOWN_EMAIL, Behavior::reject(400, "Email address already in use"))
            .with_email(DROPPED_EMAIL, Behavior::DropEmail)
    }

    pub fn with_listing(mut self, department: DepartmentId, behavior: Behavior) -> Self {
        self.listing.insert(department, behavior);
        self
    }

    pub fn with_create_department(mut self, department: DepartmentId, behavior: Behavior) -> Self {
        self.create_by_department.insert(department, behavior);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>, behavior: Behavior) -> Self {
        self.create_by_email.insert(email.into(), behavior);
        self
    }

    pub fn listing_behavior(&self, department: &DepartmentId) -> &Behavior {
        self.listing.get(department).unwrap_or(&Behavior::Succeed)
    }

    /// Department rules take precedence over email rules.
    pub fn create_behavior(&self, department: &DepartmentId, email: &str) -> &Behavior {
        self.create_by_department
            .get(department)
            .or_else(|| self.create_by_email.get(email))
            .unwrap_or(&Behavior::Succeed)
    }

    /// Employees of `department`, or the injected failure.
    pub fn list_employees(&self, department: &DepartmentId) -> Result<Vec<Employee>, ProviderError> {
        match self.listing_behavior(department) {
            Behavior::Succeed => Ok(staff()),
            Behavior::DropEmail => {
                let mut employees = staff();
                if let Some(last) = employees.last_mut() {
                    last.email = None;
                }
                Ok(employees)
            }
            Behavior::Reject { status, message } => Err(ProviderError::new(*status, message)),
        }
    }

    /// Create `employee` in `department`, assigning a fresh identifier.
    pub fn create_employee(
        &self,
        department: &DepartmentId,
        employee: NewEmployee,
    ) -> Result<Employee, ProviderError> {
        let behavior = self.create_behavior(department, &employee.email);
        let email = match behavior {
            Behavior::Reject { status, message } => {
                return Err(ProviderError::new(*status, message))
            }
            Behavior::DropEmail => None,
            Behavior::Succeed => Some(employee.email),
        };
        Ok(Employee {
            first_name: employee.first_name,
            last_name: employee.last_name,
            email,
            employee_id: Some(Uuid::new_v4()),
        })
    }
}

fn person(first: &str, email: &str) -> Employee {
    Employee {
        first_name: Some(first.to_string()),
        last_name: Some("Doe".to_string()),
        email: Some(email.to_string()),
        employee_id: Some(Uuid::new_v4()),
    }
}

/// The three employees every normal department has.
fn staff() -> Vec<Employee> {
    vec![
        person("Jane", "jane.dow@whoknows.com"),
        person("John", "doe@whoknows.com"),
        person("Robin", "robin@doe.com"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_department() -> DepartmentId {
        DepartmentId::from_uuid(Uuid::new_v4())
    }

    #[test]
    fn normal_department_lists_three_with_emails() {
        let table = FaultTable::standard();
        let employees = table.list_employees(&any_department()).unwrap();
        assert_eq!(employees.len(), 3);
        assert!(employees
            .iter()
            .all(|e| e.email.as_deref().is_some_and(|m| !m.is_empty())));
    }

    #[test]
    fn invalid_department_drops_exactly_one_email() {
        let employees = FaultTable::standard()
            .list_employees(&INVALID_DEPARTMENT)
            .unwrap();
        assert_eq!(employees.len(), 3);
        assert_eq!(employees.iter().filter(|e| e.email.is_none()).count(), 1);
    }

    #[test]
    fn reserved_departments_reject_listing() {
        let table = FaultTable::standard();
        assert_eq!(table.list_employees(&UNKNOWN_DEPARTMENT).unwrap_err().status, 404);
        assert_eq!(
            table.list_employees(&BAD_REQUEST_DEPARTMENT).unwrap_err().status,
            400
        );
    }

    #[test]
    fn unknown_department_wins_over_email() {
        let err = FaultTable::standard()
            .create_employee(&UNKNOWN_DEPARTMENT, NewEmployee::new(DROPPED_EMAIL))
            .unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[test]
    fn known_email_is_rejected() {
        let err = FaultTable::standard()
            .create_employee(&any_department(), NewEmployee::new(KNOWN_EMAIL))
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "Email address already in use");
    }

    #[test]
    fn dropped_email_succeeds_without_email() {
        let created = FaultTable::standard()
            .create_employee(
                &any_department(),
                NewEmployee::new(DROPPED_EMAIL).first_name("Jane").last_name("Doe"),
            )
            .unwrap();
        assert!(created.email.is_none());
        assert_eq!(created.first_name.as_deref(), Some("Jane"));
        assert!(created.employee_id.is_some());
    }

    #[test]
    fn other_email_is_echoed_with_new_id() {
        let table = FaultTable::standard();
        let new = NewEmployee::new("email@address.com").first_name("Jane").last_name("Doe");
        let a = table.create_employee(&any_department(), new.clone()).unwrap();
        let b = table.create_employee(&any_department(), new).unwrap();
        assert_eq!(a.email.as_deref(), Some("email@address.com"));
        assert_ne!(a.employee_id, b.employee_id);
    }

    #[test]
    fn fixtures_can_be_added() {
        let dept = any_department();
        let table = FaultTable::empty()
            .with_listing(dept, Behavior::reject(503, "maintenance"))
            .with_email("late@x.com", Behavior::reject(504, "slow"));
        assert_eq!(table.list_employees(&dept).unwrap_err().status, 503);
        assert_eq!(
            table
                .create_employee(&any_department(), NewEmployee::new("late@x.com"))
                .unwrap_err()
                .status,
            504
        );
        assert!(table.list_employees(&INVALID_DEPARTMENT).is_ok());
    }
}
