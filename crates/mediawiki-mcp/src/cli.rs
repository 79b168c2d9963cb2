//! Command-line and environment configuration, and logging setup.

use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use mediawiki_client::WikiConfig;
use mediawiki_client::config::{DEFAULT_HOST, DEFAULT_PATH};
use tracing_subscriber::EnvFilter;

use crate::http::HttpOptions;

/// Filter used at verbosity 0 when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn,mediawiki_client=info,mediawiki_mcp=info";

/// MCP transport to serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// JSON-RPC over stdin/stdout.
    Stdio,
    /// Streamable HTTP, with health routes.
    StreamableHttp,
}

/// MediaWiki MCP server
#[derive(Parser, Debug)]
#[command(name = "mcp-mediawiki", author, version, about, long_about = None)]
pub struct Args {
    /// Wiki host, optionally with a port
    #[arg(long, env = "MW_API_HOST", default_value = DEFAULT_HOST)]
    pub wiki_host: String,

    /// Wiki script path; api.php and index.php live under it
    #[arg(long, env = "MW_API_PATH", default_value = DEFAULT_PATH)]
    pub wiki_path: String,

    /// Talk to the wiki over HTTPS; any value other than `true` means plain HTTP
    #[arg(
        long,
        env = "MW_USE_HTTPS",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = parse_https_flag
    )]
    pub wiki_https: bool,

    /// Bot account username
    #[arg(long, env = "MW_BOT_USER")]
    pub bot_user: Option<String>,

    /// Bot account password
    #[arg(long, env = "MW_BOT_PASS", hide_env_values = true)]
    pub bot_pass: Option<String>,

    /// Network timeout for wiki requests, in seconds
    #[arg(
        long,
        env = "MW_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// MCP transport
    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Bind address for the HTTP transport
    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port for the HTTP transport
    #[arg(long, env = "MCP_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Mount path of the MCP endpoint
    #[arg(long, env = "MCP_PATH", default_value = "/mcp")]
    pub path: String,

    /// Bearer token required on the MCP endpoint
    #[arg(long, env = "MCP_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Wiki connection settings.
    pub fn wiki_config(&self) -> WikiConfig {
        WikiConfig::new(&self.wiki_host, &self.wiki_path, self.wiki_https)
            .with_bot_credentials(self.bot_user.as_deref(), self.bot_pass.as_deref())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// HTTP transport settings.
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            auth_token: self.auth_token.clone().filter(|t| !t.is_empty()),
        }
    }
}

fn parse_https_flag(value: &str) -> Result<bool, String> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

/// Default filter directive for a `-v` count.
pub fn log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_LOG_FILTER,
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["mcp-mediawiki"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_build_wiki_config() {
        let args = parse(&[
            "--wiki-host",
            "wiki.local:8080",
            "--wiki-path",
            "/w/",
            "--wiki-https",
            "false",
            "--bot-user",
            "Bot",
            "--bot-pass",
            "pw",
            "--timeout-secs",
            "5",
        ]);
        let config = args.wiki_config();
        assert_eq!(config.api_url(), "http://wiki.local:8080/w/api.php");
        assert_eq!(config.bot_credentials(), Some(("Bot", "pw")));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_https_flag_is_true_only_for_true() {
        assert!(parse(&["--wiki-https", "true"]).wiki_https);
        assert!(parse(&["--wiki-https", "TRUE"]).wiki_https);
        assert!(parse(&[]).wiki_https);
        for value in ["false", "0", "yes", "https"] {
            assert!(!parse(&["--wiki-https", value]).wiki_https, "{value}");
        }
    }

    #[test]
    fn test_transport_values() {
        let args = parse(&["--transport", "streamable-http", "--port", "9000"]);
        assert_eq!(args.transport, Transport::StreamableHttp);
        assert_eq!(args.http_options().port, 9000);

        let argv = ["mcp-mediawiki", "--transport", "sse"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let argv = ["mcp-mediawiki", "--timeout-secs", "0"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_empty_auth_token_means_none() {
        let args = parse(&["--auth-token", ""]);
        assert!(args.http_options().auth_token.is_none());

        let args = parse(&["--auth-token", "s3cret"]);
        assert_eq!(args.http_options().auth_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_verbose_count() {
        assert_eq!(parse(&["-vv"]).verbose, 2);
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0), DEFAULT_LOG_FILTER);
        assert_eq!(log_filter(1), "info");
        assert_eq!(log_filter(2), "debug");
        assert_eq!(log_filter(7), "debug");
    }

    #[test]
    fn test_command_is_well_formed() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
