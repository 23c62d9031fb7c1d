use anyhow::{Context, Result};
use std::ffi::OsString;
use structopt::StructOpt;
use telemetry_remote_write::ClientConfig;

pub struct Config {
    /// Enables verbose logging, including each cause of a failed push
    pub debug: bool,

    /// Encode the example request but don't send it
    pub dry_run: bool,

    /// The instance id of the hosted metrics instance (the basic auth username)
    pub instance_id: String,

    /// The api key of the hosted metrics instance (the basic auth password)
    pub api_key: String,
}

/// Fallback for `-instance.id`
pub const INSTANCE_ID_VAR: &str = "REMOTE_WRITE_INSTANCE_ID";

/// Fallback for `-api.key`
pub const API_KEY_VAR: &str = "REMOTE_WRITE_API_KEY";

impl Config {
    /// Loads configuration from arguments, then variables looked up with `env`
    pub fn from_args<I, E>(args: I, env: E) -> Result<Config>
    where
        I: IntoIterator,
        I::Item: Into<OsString>,
        E: Fn(&str) -> Option<String>,
    {
        let flags = Environment::from_iter_safe(normalize_args(args))?;

        let instance_id = flags
            .instance_id
            .or_else(|| env(INSTANCE_ID_VAR))
            .unwrap_or_default();
        if instance_id.is_empty() {
            return Err(anyhow::format_err!("-instance.id not set"));
        }
        let api_key = flags
            .api_key
            .or_else(|| env(API_KEY_VAR))
            .unwrap_or_default();
        if api_key.is_empty() {
            return Err(anyhow::format_err!("-api.key not set"));
        }

        Ok(Config {
            debug: flags.debug
                || match env("DEBUG") {
                    Some(val) if val == "true" || val == "on" || val == "1" => true,
                    Some(val) if val == "false" || val == "off" || val == "0" || val == "" => false,
                    Some(val) => val.parse::<bool>().context("invalid DEBUG")?,
                    None => false,
                },
            dry_run: flags.dry_run,
            instance_id,
            api_key,
        })
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        ClientConfig::new(self.instance_id.as_str(), self.api_key.as_str())
            .context("invalid client configuration")
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "telemetry-push")]
struct Environment {
    /// Enables verbose logging
    #[structopt(short, long)]
    debug: bool,

    /// Encode the example write request without sending it
    #[structopt(long)]
    dry_run: bool,

    /// Instance id of the desired hosted metrics instance [env: REMOTE_WRITE_INSTANCE_ID]
    #[structopt(long = "instance.id", allow_hyphen_values = true)]
    instance_id: Option<String>,

    /// Api key for the desired hosted metrics instance [env: REMOTE_WRITE_API_KEY]
    #[structopt(long = "api.key", allow_hyphen_values = true)]
    api_key: Option<String>,
}

/// Rewrites single-dash long flags (e.g. `-instance.id`) to the double-dash form.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut out = Vec::new();
    let mut takes_value = false;
    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();

        // The binary name and flag values are passed through as is
        if i == 0 || takes_value {
            takes_value = false;
            out.push(arg);
            continue;
        }

        let single_dash = arg
            .to_str()
            .map_or(false, |s| s.starts_with('-') && !s.starts_with("--") && s.len() > 2);
        let arg = if single_dash {
            let mut long = OsString::from("-");
            long.push(&arg);
            long
        } else {
            arg
        };
        takes_value = arg == "--instance.id" || arg == "--api.key";
        out.push(arg);
    }
    out
}
