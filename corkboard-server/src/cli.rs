use clap::{Arg, Command, ValueHint};
use std::path::PathBuf;

/// CLI arguments for corkboard-server
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub jwt_secret: Option<String>,
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Parse command line arguments
    pub fn parse() -> Self {
        let matches = Command::new("corkboard-server")
            .version(corkboard::VERSION)
            .about("HTTP API server for the Corkboard social-graph engine")
            .long_about(
                r#"Corkboard Server exposes the friend-request state machine, relationship
views, and the visibility-filtered content feed over a REST API. Mutation
endpoints are guarded by a per-route sliding-window rate governor.

The server can be configured through command line arguments or environment
variables. Command line arguments take precedence over environment variables.

Examples:
  corkboard-server --port 8080
  corkboard-server --config corkboard.toml --log-level debug"#,
            )
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on")
                    .long_help(
                        "Port number for the HTTP server to listen on.
Environment variable: CORKBOARD_PORT",
                    )
                    .value_hint(ValueHint::Other)
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .long_help(
                        "Path to a TOML engine configuration file, merged with
environment variables and defaults.",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("jwt_secret")
                    .long("jwt-secret")
                    .value_name("SECRET")
                    .help("JWT validation secret")
                    .long_help(
                        "Secret used to validate bearer tokens issued by the
external authentication service.
Environment variable: CORKBOARD_JWT_SECRET",
                    )
                    .value_hint(ValueHint::Other),
            )
            .arg(
                Arg::new("log_level")
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Logging level")
                    .long_help(
                        "Set the logging level. Valid values: error, warn, info, debug, trace
Environment variable: RUST_LOG",
                    )
                    .value_parser(["error", "warn", "info", "debug", "trace"]),
            )
            .get_matches();

        Self {
            port: matches.get_one::<u16>("port").copied(),
            jwt_secret: matches.get_one::<String>("jwt_secret").cloned(),
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            log_level: matches.get_one::<String>("log_level").cloned(),
        }
    }
}
