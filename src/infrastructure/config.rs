use anyhow::{Context, Result};
use std::env;
use url::Url;

const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";

/// Where the remote backend lives.
///
/// `database_url` is the base of the keyed JSON store (`coaches/...`,
/// `requests/...`); `identity_url` is the base of the identity provider, and
/// `api_key` is appended to every identity call as a query parameter.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub database_url: Url,
    pub identity_url: Url,
    pub api_key: String,
}

impl BackendConfig {
    pub fn new(database_url: Url, identity_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            database_url,
            identity_url,
            api_key: api_key.into(),
        }
    }

    /// Reads `FINDCOACH_DATABASE_URL`, `FINDCOACH_IDENTITY_URL` (optional,
    /// defaults to the Google identity toolkit) and `FINDCOACH_API_KEY`,
    /// honoring a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database_url = env::var("FINDCOACH_DATABASE_URL")
            .context("FINDCOACH_DATABASE_URL is not set")?
            .parse::<Url>()
            .context("FINDCOACH_DATABASE_URL is not a valid URL")?;

        let identity_url = match env::var("FINDCOACH_IDENTITY_URL") {
            Ok(raw) => raw
                .parse::<Url>()
                .context("FINDCOACH_IDENTITY_URL is not a valid URL")?,
            Err(_) => DEFAULT_IDENTITY_URL
                .parse::<Url>()
                .expect("default identity URL is valid"),
        };

        let api_key = env::var("FINDCOACH_API_KEY").context("FINDCOACH_API_KEY is not set")?;

        Ok(Self::new(database_url, identity_url, api_key))
    }
}
