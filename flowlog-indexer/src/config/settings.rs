//! Environment-backed configuration.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::IndexingError;

/// Default per-call timeout when the trigger supplies no deadline.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
const ES_HOST: &str = "ES_HOST";
const ES_REGION: &str = "ES_REGION";
const ES_INDEX: &str = "ES_INDEX";
const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

/// Validated invocation configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Static AWS access key used for S3 reads and request signing.
    pub access_key_id: String,
    /// Secret paired with `access_key_id`.
    pub secret_access_key: String,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
    /// OpenSearch domain endpoint.
    pub es_host: String,
    /// Region of the OpenSearch domain, used for signing.
    pub es_region: String,
    /// Prefix of every index name.
    pub index_prefix: String,
    /// Upper bound for each network call.
    pub request_timeout: Duration,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `AWS_ACCESS_KEY_ID`: Access key (required)
    /// - `AWS_SECRET_ACCESS_KEY`: Secret key (required)
    /// - `AWS_SESSION_TOKEN`: Session token (optional)
    /// - `ES_HOST`: OpenSearch endpoint URL (required)
    /// - `ES_REGION`: OpenSearch domain region (required)
    /// - `ES_INDEX`: Index name prefix (required)
    /// - `REQUEST_TIMEOUT_SECS`: Per-call timeout in seconds (default: 30)
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Every required variable is set and non-empty
    /// * `Err(IndexingError)` - A configuration error naming all missing variables
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            let value = get(name);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let access_key_id = required(AWS_ACCESS_KEY_ID);
        let secret_access_key = required(AWS_SECRET_ACCESS_KEY);
        let es_host = required(ES_HOST);
        let es_region = required(ES_REGION);
        let index_prefix = required(ES_INDEX);

        if !missing.is_empty() {
            return Err(IndexingError::config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let request_timeout = match get(REQUEST_TIMEOUT_SECS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(IndexingError::config(format!(
                        "{} must be a positive integer, got {:?}",
                        REQUEST_TIMEOUT_SECS, raw
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: get(AWS_SESSION_TOKEN),
            es_host,
            es_region,
            index_prefix,
            request_timeout,
        })
    }
}

// Credentials stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("es_host", &self.es_host)
            .field("es_region", &self.es_region)
            .field("index_prefix", &self.index_prefix)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
