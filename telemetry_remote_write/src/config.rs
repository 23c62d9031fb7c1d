use std::fmt;
use std::time::Duration;
use surf::Url;

use crate::error::ConfigError;

/// The hosted metrics endpoint that receives remote write requests.
pub const DEFAULT_WRITE_URL: &str = "https://prometheus-us-central1.grafana.net/api/prom/push";

/// How long a single remote write (request and response) may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Endpoint and credentials for a `WriteClient`, fixed once constructed.
#[derive(Clone)]
pub struct ClientConfig {
    url: Url,
    instance_id: String,
    api_key: String,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Configures the default endpoint with the given credentials.
    ///
    /// Both the instance id (the basic auth username) and the api key
    /// (the password) must be non-empty.
    pub fn new(
        instance_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<ClientConfig, ConfigError> {
        let instance_id = instance_id.into();
        if instance_id.is_empty() {
            return Err(ConfigError::MissingInstanceId);
        }
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(ClientConfig {
            url: default_url(),
            instance_id,
            api_key,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url.as_str())
            .field("instance_id", &self.instance_id)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

fn default_url() -> Url {
    // DEFAULT_WRITE_URL is a valid absolute url
    Url::parse(DEFAULT_WRITE_URL).unwrap()
}
