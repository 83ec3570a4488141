//! Resilient client for the upstream employee service.
//!
//! Both operations go through [`run_with_retry`]: 502-504, timeouts and
//! connection failures are retried with a fixed delay, every other failure
//! reaches the caller on first occurrence.

mod transport;

pub use transport::{
    CurlTransport, HttpRequest, HttpResponse, Method, Transport, TransportConfig,
};

use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::model::{DepartmentId, Employee, EmployeesListing, NewEmployee};
use crate::retry::{run_with_retry, RetryPolicy, UpstreamError};

/// Path prefix of the provider's REST surface.
pub const BASE_PATH: &str = "demo-service/v1/";

/// Everything the client needs, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    /// Upper bound on one logical call including retries and delays.
    pub request_timeout: Duration,
    pub transport: TransportConfig,
    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_millis(10_000),
            transport: TransportConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Path of the employee collection of a department, relative to the base URL.
pub fn employee_path(department: &DepartmentId) -> String {
    format!("{BASE_PATH}departments/{department}/employees")
}

/// Client for `.../departments/{id}/employees`.
///
/// Holds only immutable configuration; share it freely across threads.
/// Calls block the current thread; use `spawn_blocking` from async code.
#[derive(Debug, Clone)]
pub struct UpstreamClient<T = CurlTransport> {
    base_url: Url,
    request_timeout: Duration,
    retry: RetryPolicy,
    transport: T,
}

impl UpstreamClient<CurlTransport> {
    pub fn new(settings: ClientSettings) -> Result<Self, UpstreamError> {
        let transport = CurlTransport::new(settings.transport);
        Self::with_transport(settings, transport)
    }
}

impl<T: Transport> UpstreamClient<T> {
    /// Build a client over a custom transport (tests, instrumentation).
    pub fn with_transport(settings: ClientSettings, transport: T) -> Result<Self, UpstreamError> {
        let mut base_url = Url::parse(settings.base_url.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(UpstreamError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            request_timeout: settings.request_timeout,
            retry: settings.retry,
            transport,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URL of a department's employee collection.
    pub fn employees_url(&self, department: &DepartmentId) -> Result<Url, UpstreamError> {
        Ok(self.base_url.join(&employee_path(department))?)
    }

    /// Fetch the employee listing of `department`.
    pub fn list_employees(&self, department: &DepartmentId) -> Result<Vec<Employee>, UpstreamError> {
        let request = HttpRequest {
            method: Method::Get,
            url: self.employees_url(department)?.into(),
            body: None,
        };
        let listing: EmployeesListing = self.send(&request)?;
        tracing::info!(
            %department,
            count = listing.employees.len(),
            "listed employees"
        );
        Ok(listing.employees)
    }

    /// Create `employee` in `department`; returns the provider's
    /// representation carrying the assigned identifier.
    pub fn create_employee(
        &self,
        department: &DepartmentId,
        employee: &NewEmployee,
    ) -> Result<Employee, UpstreamError> {
        let body = serde_json::to_vec(employee).map_err(UpstreamError::Encode)?;
        let request = HttpRequest {
            method: Method::Post,
            url: self.employees_url(department)?.into(),
            body: Some(body),
        };
        let created: Employee = self.send(&request)?;
        tracing::info!(
            %department,
            employee_id = ?created.employee_id,
            "created employee"
        );
        Ok(created)
    }

    fn send<R: DeserializeOwned>(&self, request: &HttpRequest) -> Result<R, UpstreamError> {
        run_with_retry(&self.retry, Some(self.request_timeout), |attempt| {
            self.attempt(request, attempt)
        })
    }

    fn attempt<R: DeserializeOwned>(
        &self,
        request: &HttpRequest,
        attempt: u32,
    ) -> Result<R, UpstreamError> {
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            attempt,
            "upstream request"
        );
        let response = self
            .transport
            .execute(request)
            .map_err(UpstreamError::Transport)?;
        if !response.is_success() {
            tracing::error!(
                status = response.status,
                body = %String::from_utf8_lossy(&response.body),
                "upstream error response"
            );
            return Err(UpstreamError::from_status(response.status, &response.body));
        }
        serde_json::from_slice(&response.body).map_err(|source| UpstreamError::Decode {
            status: response.status,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<HttpResponse, curl::Error>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn reply(self, status: u16, body: &str) -> Self {
            self.replies.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            }));
            self
        }

        fn fail(self, code: i32) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(curl::Error::new(code as _)));
            self
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, curl::Error> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
    }

    const LISTING: &str = r#"{"employees":[
        {"firstName":"Jane","lastName":"Doe","email":"jane@x.com","employeeId":"6a7e41b9-cacf-44f4-95b7-af1fdd60f3c8"}
    ]}"#;

    fn department() -> DepartmentId {
        "6a7e41b9-cacf-44f4-95b7-af1fdd60f3c8".parse().unwrap()
    }

    fn client(transport: ScriptedTransport, max_attempts: u32) -> UpstreamClient<ScriptedTransport> {
        let settings = ClientSettings {
            base_url: "http://upstream.test:9000".to_string(),
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(5)),
            ..ClientSettings::default()
        };
        UpstreamClient::with_transport(settings, transport).unwrap()
    }

    #[test]
    fn builds_department_scoped_url() {
        let c = client(ScriptedTransport::default(), 1);
        assert_eq!(
            c.employees_url(&department()).unwrap().as_str(),
            "http://upstream.test:9000/demo-service/v1/departments/6a7e41b9-cacf-44f4-95b7-af1fdd60f3c8/employees"
        );
    }

    #[test]
    fn base_url_with_path_prefix_is_kept() {
        let settings = ClientSettings {
            base_url: "http://gw.test/upstream".to_string(),
            ..ClientSettings::default()
        };
        let c = UpstreamClient::with_transport(settings, ScriptedTransport::default()).unwrap();
        assert!(c
            .employees_url(&department())
            .unwrap()
            .as_str()
            .starts_with("http://gw.test/upstream/demo-service/v1/"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let settings = ClientSettings {
            base_url: "not a url".to_string(),
            ..ClientSettings::default()
        };
        let err = UpstreamClient::with_transport(settings, ScriptedTransport::default()).unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidBaseUrl(_)));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let settings = ClientSettings {
            base_url: "file:///tmp/roster".to_string(),
            ..ClientSettings::default()
        };
        let err = UpstreamClient::with_transport(settings, ScriptedTransport::default()).unwrap_err();
        assert!(matches!(err, UpstreamError::UnsupportedScheme(ref s) if s == "file"));
    }

    #[test]
    fn two_503_then_success_takes_three_calls() {
        let t = ScriptedTransport::default()
            .reply(503, "")
            .reply(503, "")
            .reply(200, LISTING);
        let c = client(t, 5);
        let employees = c.list_employees(&department()).unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(c.transport().calls(), 3);
    }

    #[test]
    fn always_503_exhausts_after_max_attempts() {
        let t = ScriptedTransport::default()
            .reply(503, "")
            .reply(503, "")
            .reply(503, "")
            .reply(503, "");
        let c = client(t, 3);
        let err = c.list_employees(&department()).unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.status(), Some(503));
        assert_eq!(c.transport().calls(), 3);
    }

    #[test]
    fn bad_request_is_not_retried() {
        let t = ScriptedTransport::default()
            .reply(400, r#"{"message":"Never liked that department anyway","status":400}"#)
            .reply(200, LISTING);
        let c = client(t, 5);
        let err = c.list_employees(&department()).unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::Permanent { status: 400, ref message } if message == "Never liked that department anyway"
        ));
        assert_eq!(c.transport().calls(), 1);
    }

    #[test]
    fn timeout_is_retried_like_gateway_error() {
        // CURLE_OPERATION_TIMEDOUT
        let t = ScriptedTransport::default().fail(28).reply(200, LISTING);
        let c = client(t, 3);
        assert!(c.list_employees(&department()).is_ok());
        assert_eq!(c.transport().calls(), 2);
    }

    #[test]
    fn undecodable_success_body_is_terminal() {
        let t = ScriptedTransport::default().reply(200, "<html>").reply(200, LISTING);
        let c = client(t, 3);
        let err = c.list_employees(&department()).unwrap_err();
        assert!(matches!(err, UpstreamError::Decode { status: 200, .. }));
        assert_eq!(c.transport().calls(), 1);
    }

    #[test]
    fn create_posts_body_without_identifier() {
        let t = ScriptedTransport::default().reply(
            201,
            r#"{"firstName":"Simone","lastName":"Giertz","email":"simone@best-robots.com","employeeId":"00d6e488-7552-48e6-a082-47d059c77ee2"}"#,
        );
        let c = client(t, 3);
        let new = NewEmployee::new("simone@best-robots.com")
            .first_name("Simone")
            .last_name("Giertz");
        let created = c.create_employee(&department(), &new).unwrap();
        assert!(created.employee_id.is_some());

        let seen = c.transport().seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Post);
        let sent: serde_json::Value = serde_json::from_slice(seen[0].body.as_ref().unwrap()).unwrap();
        assert!(sent.get("employeeId").is_none());
        assert_eq!(sent["email"], "simone@best-robots.com");
    }
}
