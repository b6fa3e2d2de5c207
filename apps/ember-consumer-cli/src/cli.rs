use clap::{Arg, Command};

/// Connect to an Ember+ device, walk its tree, and write a snapshot file.
#[derive(Debug)]
pub struct Cli {
    /// Path to the TOML config file.
    pub config: String,
    /// Override the configured device host.
    pub host: Option<String>,
    /// Override the configured device port.
    pub port: Option<u16>,
    /// Override the configured snapshot output path.
    pub output: Option<String>,
}

fn validate_port_value(value: &str) -> Result<u16, String> {
    value.parse::<u16>().map_err(|_| "Invalid port number".to_owned())
}

impl Cli {
    pub fn parse() -> Self {
        let matches = Command::new("ember-consumer-cli")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Connect to an Ember+ device, walk its tree, and write a snapshot file")
            .arg(
                Arg::new("config")
                    .help("Path to the TOML config file")
                    .long("config")
                    .default_value("/etc/ember-engine/consumer.toml"),
            )
            .arg(Arg::new("host").help("Override the configured device host").long("host"))
            .arg(
                Arg::new("port")
                    .help("Override the configured device port")
                    .long("port")
                    .value_parser(validate_port_value),
            )
            .arg(Arg::new("output").help("Override the configured snapshot output path").long("output"))
            .get_matches();

        Cli {
            config: matches.get_one::<String>("config").expect("config has a default").clone(),
            host: matches.get_one::<String>("host").cloned(),
            port: matches.get_one::<u16>("port").copied(),
            output: matches.get_one::<String>("output").cloned(),
        }
    }
}
