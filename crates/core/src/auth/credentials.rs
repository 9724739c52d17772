use serde::Serialize;

/// Credentials pulled from request headers.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Token from `Authorization: Bearer <token>`.
    pub bearer: Option<String>,
    /// Value of `X-API-Key`.
    pub api_key: Option<String>,
}

impl Credentials {
    /// Build from raw `Authorization` and `X-API-Key` header values.
    pub fn from_headers(authorization: Option<&str>, api_key: Option<&str>) -> Self {
        let bearer = authorization.and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
                .map(|token| token.trim().to_string())
        });

        Self {
            bearer,
            api_key: api_key.map(|v| v.trim().to_string()),
        }
    }

    /// The presented key, bearer token first.
    pub fn presented_key(&self) -> Option<&str> {
        self.bearer.as_deref().or(self.api_key.as_deref())
    }
}

/// Who made an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub subject: String,
    pub method: &'static str,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".to_string(),
            method: "none",
        }
    }
}
