//! Telemetry Push
//!
//! Pushes an example series to a hosted metrics instance with a single remote write request.

mod config;
mod example;

use anyhow::{Context, Result}; // alias std::result::Result with dynamic error type
use chrono::prelude::*;
use std::ffi::OsString;
use structopt::clap::{self, ErrorKind};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use telemetry_remote_write::{decode, encode, WriteClient};

use crate::config::Config;

/// The program's main entry point.
fn main() {
    // Attempts to find a `.env` file to initialize/extend the environment
    dotenv::dotenv().ok();

    let env = |key: &str| dotenv::var(key).ok();
    let code = async_std::task::block_on(execute(std::env::args_os(), env, surf::Client::new()));
    std::process::exit(code);
}

/// Runs the program with the given arguments and environment, returning its exit code
async fn execute<I, E>(args: I, env: E, http: surf::Client) -> i32
where
    I: IntoIterator,
    I::Item: Into<OsString>,
    E: Fn(&str) -> Option<String>,
{
    let config = match Config::from_args(args, env) {
        Ok(config) => config,
        Err(err) => {
            if let Some(err) = err.downcast_ref::<clap::Error>() {
                println!("{}", err.message);
                return match err.kind {
                    ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => 0,
                    _ => 1,
                };
            }
            println!("error: {}", err);
            return 1;
        }
    };
    init_logging(config.debug);

    match run(&config, http).await {
        Ok(()) => 0,
        Err(err) => {
            println!("error: {:#}", err);
            debug_error(&err);
            1
        }
    }
}

async fn run(config: &Config, http: surf::Client) -> Result<()> {
    let client_config = config.client_config()?;

    // Get the current timestamp (w/o nanoseconds); we don't need that level of precision
    let now = Utc::now().timestamp();
    let series = example::build_example_series(now);
    let payload = encode(series).context("failed to encode write request")?;

    if config.dry_run {
        let request = decode(payload.as_bytes()).context("failed to decode write request")?;
        for series in &request.timeseries {
            println!(
                "Encoded {} ({} samples)",
                series.metric_name().unwrap_or("<unnamed>"),
                series.samples.len()
            );
        }
        println!(
            "Encoded {} series into {} bytes",
            request.timeseries.len(),
            payload.len()
        );
        return Ok(());
    }

    let client = WriteClient::with_client(http, client_config);
    client
        .send(payload)
        .await
        .with_context(|| format!("remote write to {} failed", client.config().url()))?;
    debug!("remote write succeeded");
    Ok(())
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the `--debug` level
fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

/// Logs each cause of a failure
fn debug_error(err: &anyhow::Error) {
    for cause in err.chain().skip(1) {
        debug!("caused by: {}", cause);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use async_std::task::block_on;
    use surf::StatusCode;
    use telemetry_remote_write::config::DEFAULT_WRITE_URL;
    use telemetry_remote_write::testing::StubTransport;
    use telemetry_remote_write::Label;

    fn execute_with(args: &[&str], stub: &StubTransport) -> i32 {
        let mut argv = vec!["telemetry-push"];
        argv.extend_from_slice(args);
        block_on(execute(argv, |_: &str| None, stub.client()))
    }

    #[test]
    fn rejects_missing_credentials() {
        let stub = StubTransport::respond(StatusCode::Ok, "");

        // It exits with status 1 when either flag is missing or empty
        assert_eq!(execute_with(&[], &stub), 1);
        assert_eq!(execute_with(&["-instance.id", "12345"], &stub), 1);
        assert_eq!(execute_with(&["-api.key", "key"], &stub), 1);
        assert_eq!(execute_with(&["-instance.id", "", "-api.key", "key"], &stub), 1);
        assert_eq!(execute_with(&["-instance.id=12345", "-api.key="], &stub), 1);

        // It never reaches the network
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn pushes_example_metrics() {
        let stub = StubTransport::respond(StatusCode::Ok, "");

        // It exits with status 0 after a successful push
        let code = execute_with(&["-instance.id", "12345", "-api.key", "key"], &stub);
        assert_eq!(code, 0);

        // It sends one request to the hosted metrics endpoint
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, DEFAULT_WRITE_URL);
        assert_eq!(
            requests[0].basic_auth,
            Some(("12345".to_owned(), "key".to_owned()))
        );

        // It sends the compressed example series
        let request = decode(&requests[0].body).unwrap();
        assert_eq!(request.timeseries.len(), 1);
        let series = &request.timeseries[0];
        assert_eq!(series.labels[0], Label::new("__name__", "random_metric"));
        assert_eq!(
            series.labels[1],
            Label::new("example_label_name", "example_label_value")
        );
        assert_eq!(series.samples.len(), 2);
        assert_eq!(series.samples[1].timestamp - series.samples[0].timestamp, 1000);
        assert!(series.samples.iter().all(|sample| sample.value == 1.0));
    }

    #[test]
    fn fails_on_rejected_pushes() {
        let args = ["-instance.id", "12345", "-api.key", "key"];

        // It exits with status 1 on server errors and other rejections
        let stub = StubTransport::respond(StatusCode::ServiceUnavailable, "try again");
        assert_eq!(execute_with(&args, &stub), 1);
        let stub = StubTransport::respond(StatusCode::Unauthorized, "invalid credentials");
        assert_eq!(execute_with(&args, &stub), 1);
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn skips_the_network_on_dry_runs() {
        let stub = StubTransport::respond(StatusCode::Ok, "");

        // It encodes the request and exits with status 0 without sending it
        let code = execute_with(&["-instance.id", "12345", "-api.key", "key", "--dry-run"], &stub);
        assert_eq!(code, 0);
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn rejects_unknown_flags() {
        let stub = StubTransport::respond(StatusCode::Ok, "");

        // It exits with status 1 on usage errors
        assert_eq!(execute_with(&["-endpoint", "https://localhost"], &stub), 1);
        assert_eq!(stub.calls(), 0);
    }
}
