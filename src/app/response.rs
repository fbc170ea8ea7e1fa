//! Response values produced by controllers and the application.

use serde::Serialize;

/// Outcome of handling one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            location: None,
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn not_found() -> Self {
        Self::new(404, "Page not found")
    }

    pub fn forbidden() -> Self {
        Self::new(403, "Access was denied.")
    }

    /// Permanent redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            status: 301,
            body: format!("Moved to {location}"),
            location: Some(location),
        }
    }

    pub fn internal_error(body: impl Into<String>) -> Self {
        Self::new(500, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
