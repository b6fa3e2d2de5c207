use clap::{Arg, Command};

/// Load a captured Ember+ device snapshot and serve it to connecting
/// consumers.
#[derive(Debug)]
pub struct Cli {
    /// Path to the TOML config file.
    pub config: String,
    /// Override the configured snapshot file to serve.
    pub snapshot: Option<String>,
    /// Override the configured listen port.
    pub port: Option<u16>,
}

fn validate_port_value(value: &str) -> Result<u16, String> {
    value.parse::<u16>().map_err(|_| "Invalid port number".to_owned())
}

impl Cli {
    pub fn parse() -> Self {
        let matches = Command::new("ember-provider-cli")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Load a captured Ember+ device snapshot and serve it to connecting consumers")
            .arg(
                Arg::new("config")
                    .help("Path to the TOML config file")
                    .long("config")
                    .default_value("/etc/ember-engine/provider.toml"),
            )
            .arg(Arg::new("snapshot").help("Override the configured snapshot file to serve").long("snapshot"))
            .arg(
                Arg::new("port")
                    .help("Override the configured listen port")
                    .long("port")
                    .value_parser(validate_port_value),
            )
            .get_matches();

        Cli {
            config: matches.get_one::<String>("config").expect("config has a default").clone(),
            snapshot: matches.get_one::<String>("snapshot").cloned(),
            port: matches.get_one::<u16>("port").copied(),
        }
    }
}
