//! Earthdata-authenticated HTTP session.
//!
//! LP DAAC data pools answer anonymous requests with a redirect to the URS
//! login host. The session keeps a cookie store so the URS token obtained
//! after the first authenticated request covers the rest of the run, and
//! replays a request with basic auth when the redirect chain ends in a 401.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};

/// Environment variable names for the Earthdata account.
const USER_VAR: &str = "EARTHDATA_USER";
const PASSWORD_VAR: &str = "EARTHDATA_PASSWORD";

/// Earthdata account credentials.
#[derive(Debug, Clone)]
pub struct EarthdataCredentials {
    pub username: String,
    pub password: String,
}

impl EarthdataCredentials {
    /// Read credentials from the environment (a `.env` file is loaded by
    /// the service before this is called).
    pub fn from_env() -> Result<Self> {
        let username = std::env::var(USER_VAR)
            .map_err(|_| anyhow!("{} is not set; an Earthdata account is required", USER_VAR))?;
        let password = std::env::var(PASSWORD_VAR)
            .map_err(|_| anyhow!("{} is not set; an Earthdata account is required", PASSWORD_VAR))?;
        Ok(Self { username, password })
    }
}

/// HTTP session holding the client, cookie store and credentials.
pub struct EarthdataSession {
    client: Client,
    credentials: EarthdataCredentials,
}

impl EarthdataSession {
    /// Create a session with the given request timeout.
    pub fn new(credentials: EarthdataCredentials, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .cookie_store(true)
            .pool_max_idle_per_host(4)
            .build()
            .context("Failed to create HTTP client")?;

        info!(user = %credentials.username, "Created Earthdata session");
        Ok(Self {
            client,
            credentials,
        })
    }

    /// GET a URL, authenticating against URS when the server asks for it.
    ///
    /// Redirects are followed by the client; an unauthenticated chain ends
    /// in a 401 from the login host, which is replayed once with basic
    /// auth. The session cookie then covers subsequent requests.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let auth_url = response.url().clone();
            debug!(url = %auth_url, "Replaying request with credentials");

            let response = self
                .client
                .get(auth_url)
                .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                .send()
                .await
                .context("Authenticated request failed")?;

            return response
                .error_for_status()
                .context("Earthdata login rejected");
        }

        response.error_for_status().context("Request failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_from_env() {
        std::env::set_var(USER_VAR, "someone");
        std::env::set_var(PASSWORD_VAR, "secret");

        let creds = EarthdataCredentials::from_env().unwrap();
        assert_eq!(creds.username, "someone");
        assert_eq!(creds.password, "secret");

        std::env::remove_var(USER_VAR);
        std::env::remove_var(PASSWORD_VAR);
        assert!(EarthdataCredentials::from_env().is_err());
    }
}
