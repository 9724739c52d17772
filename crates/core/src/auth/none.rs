use async_trait::async_trait;

use super::{AuthError, Authenticator, Credentials, Identity};

/// Accepts every request as anonymous.
/// Only used when `auth.method = "none"` is configured explicitly.
#[derive(Debug, Default)]
pub struct NoneAuthenticator;

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}
