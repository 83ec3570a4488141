//! Response contract checks.
//!
//! The provider's documented schema requires `lastName`, `email` and
//! `employeeId` on every employee it returns. The client decodes leniently,
//! so these checks are how a caller finds out a response broke the contract.

use std::fmt;

use crate::model::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    MissingField,
    EmptyField,
}

/// One contract violation, addressed by a JSON-ish path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub rule: Rule,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::MissingField => write!(f, "{}: missing required field", self.path),
            Rule::EmptyField => write!(f, "{}: required field is empty", self.path),
        }
    }
}

fn check_text(prefix: &str, field: &str, value: Option<&str>, out: &mut Vec<Violation>) {
    let rule = match value {
        None => Rule::MissingField,
        Some(v) if v.trim().is_empty() => Rule::EmptyField,
        Some(_) => return,
    };
    out.push(Violation {
        path: format!("{prefix}{field}"),
        rule,
    });
}

fn check_into(prefix: &str, employee: &Employee, out: &mut Vec<Violation>) {
    check_text(prefix, "lastName", employee.last_name.as_deref(), out);
    check_text(prefix, "email", employee.email.as_deref(), out);
    if employee.employee_id.is_none() {
        out.push(Violation {
            path: format!("{prefix}employeeId"),
            rule: Rule::MissingField,
        });
    }
}

/// Check a single employee returned by the provider.
pub fn check_employee(employee: &Employee) -> Vec<Violation> {
    let mut out = Vec::new();
    check_into("", employee, &mut out);
    out
}

/// Check every entry of a listing; paths carry the entry index.
pub fn check_listing(employees: &[Employee]) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, employee) in employees.iter().enumerate() {
        check_into(&format!("employees[{i}]."), employee, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn full(email: &str) -> Employee {
        Employee {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            email: Some(email.into()),
            employee_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn complete_employee_passes() {
        assert!(check_employee(&full("jane@doe.com")).is_empty());
    }

    #[test]
    fn first_name_is_optional() {
        let mut e = full("jane@doe.com");
        e.first_name = None;
        assert!(check_employee(&e).is_empty());
    }

    #[test]
    fn missing_email_in_listing_is_reported_with_index() {
        let mut robin = full("unused");
        robin.email = None;
        let violations = check_listing(&[full("a@b.c"), full("d@e.f"), robin]);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "employees[2].email: missing required field");
    }

    #[test]
    fn blank_email_is_empty_field() {
        let violations = check_employee(&full("  "));
        assert_eq!(
            violations,
            vec![Violation {
                path: "email".into(),
                rule: Rule::EmptyField
            }]
        );
    }

    #[test]
    fn missing_identifier_is_reported() {
        let mut e = full("a@b.c");
        e.employee_id = None;
        assert_eq!(check_employee(&e)[0].path, "employeeId");
    }
}
