use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use super::cli::Cli;
use super::model::{FileConfig, ProbeMethod};
use crate::probe::prelude::{ConfiguredProber, PingProber, TcpProber};
use crate::relays::prelude::{DirectoryError, RelayFilter, parse_relay_list_url};

const DEFAULT_CONFIG_FILE: &str = "relayping.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    RelayListUrl(#[from] DirectoryError),
}

/// What the invocation should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ListCountries,
    ListCities,
    ListCitiesInCountry(String),
    ListProviders,
    Probe,
}

/// Fully resolved settings: file, then environment, then command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub relay_list_url: Url,
    pub domain_suffix: String,
    pub concurrency_limit: usize,
    pub probe_timeout: Duration,
    pub probe_method: ProbeMethod,
    pub tcp_port: u16,
    pub ping_command: String,
    pub next_fastest_count: usize,
    pub filter: RelayFilter,
    pub show_next_fastest: bool,
    pub json: bool,
}

impl AppConfig {
    pub fn prober(&self) -> ConfiguredProber {
        match self.probe_method {
            ProbeMethod::Icmp => ConfiguredProber::Ping(PingProber::new(self.ping_command.clone())),
            ProbeMethod::Tcp => ConfiguredProber::Tcp(TcpProber::new(self.tcp_port)),
        }
    }
}

/// Load the application configuration for this invocation.
/// Reads `.env` if present, then the settings file named by `--config` or the
/// `CONFIG_FILE` environment variable (falling back to `relayping.yml` when it
/// exists), applies `RELAY_LIST_URL` and `PING_COMMAND` from the environment,
/// and finally the command line flags.
pub fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let lookup = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());

    let explicit = cli
        .config
        .clone()
        .or_else(|| lookup("CONFIG_FILE").map(PathBuf::from));
    let file = match explicit {
        Some(path) => read_file_config(&path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            read_file_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => FileConfig::default(),
    };

    resolve(cli, file, lookup)
}

pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Using settings from {}", path.display());
    parse_file_config(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_file_config(contents: &str) -> Result<FileConfig, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(contents)
}

/// Merges the settings layers. `env_lookup` stands in for the process environment.
pub fn resolve(
    cli: &Cli,
    file: FileConfig,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let relay_list_url = cli
        .relay_list_url
        .clone()
        .or_else(|| env_lookup("RELAY_LIST_URL"))
        .unwrap_or(file.relay_list_url);
    let relay_list_url = parse_relay_list_url(&relay_list_url)?;

    let ping_command = env_lookup("PING_COMMAND").unwrap_or(file.ping_command);
    if ping_command.trim().is_empty() {
        return Err(ConfigError::Invalid("ping_command must not be empty".to_string()));
    }

    let concurrency_limit = cli.max_concurrent_pings.unwrap_or(file.max_concurrent_pings);
    if concurrency_limit == 0 {
        return Err(ConfigError::Invalid(
            "max concurrent pings must be at least 1".to_string(),
        ));
    }

    let timeout_seconds = cli.timeout.unwrap_or(file.timeout_seconds);
    let probe_timeout = Duration::try_from_secs_f64(timeout_seconds)
        .ok()
        .filter(|timeout| !timeout.is_zero())
        .ok_or_else(|| {
            ConfigError::Invalid(format!(
                "timeout must be a positive number of seconds, got {timeout_seconds}"
            ))
        })?;

    let mode = if cli.list_countries {
        Mode::ListCountries
    } else if cli.list_cities {
        Mode::ListCities
    } else if let Some(country) = &cli.list_cities_in_country {
        Mode::ListCitiesInCountry(country.clone())
    } else if cli.list_providers {
        Mode::ListProviders
    } else {
        Mode::Probe
    };

    let filter = RelayFilter {
        provider: cli.provider.clone(),
        country_codes: cli.country_code.clone(),
        city_codes: cli.city_code.clone(),
        exclude_country_code: cli.exclude_country_code.clone(),
        exclude_city_code: cli.exclude_city_code.clone(),
        exclude_state: cli.exclude_state.clone(),
        vpn_type: cli.vpn_type,
        include_inactive: cli.include_inactive,
    };

    let config = AppConfig {
        mode,
        relay_list_url,
        domain_suffix: file.domain_suffix,
        concurrency_limit,
        probe_timeout,
        probe_method: cli.probe_method.unwrap_or(file.probe_method),
        tcp_port: cli.tcp_port.unwrap_or(file.tcp_port),
        ping_command,
        next_fastest_count: file.next_fastest_count,
        filter,
        show_next_fastest: cli.show_next_fastest,
        json: cli.json,
    };

    log::info!(
        "Relay list: {}, concurrency: {}, timeout: {:?}, method: {:?}",
        config.relay_list_url,
        config.concurrency_limit,
        config.probe_timeout,
        config.probe_method
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["relayping"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse")
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&cli(&[]), FileConfig::default(), no_env).expect("config");
        assert_eq!(config.mode, Mode::Probe);
        assert_eq!(config.concurrency_limit, 10);
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.relay_list_url.as_str(), "https://api.mullvad.net/www/relays/all/");
        assert_eq!(config.filter, RelayFilter::default());
        assert!(matches!(config.prober(), ConfiguredProber::Ping(_)));
    }

    #[test]
    fn test_cli_overrides_env_overrides_file() {
        let file = FileConfig {
            relay_list_url: "https://file.example/relays".to_string(),
            max_concurrent_pings: 3,
            ..Default::default()
        };
        let env = |key: &str| match key {
            "RELAY_LIST_URL" => Some("https://env.example/relays".to_string()),
            "PING_COMMAND" => Some("/usr/bin/ping".to_string()),
            _ => None,
        };

        let config = resolve(&cli(&[]), file.clone(), env).expect("config");
        assert_eq!(config.relay_list_url.as_str(), "https://env.example/relays");
        assert_eq!(config.ping_command, "/usr/bin/ping");
        assert_eq!(config.concurrency_limit, 3);

        let config = resolve(
            &cli(&["--relay-list-url", "https://cli.example/relays", "--max-concurrent-pings", "7"]),
            file,
            env,
        )
        .expect("config");
        assert_eq!(config.relay_list_url.as_str(), "https://cli.example/relays");
        assert_eq!(config.concurrency_limit, 7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero = resolve(&cli(&["--max-concurrent-pings", "0"]), FileConfig::default(), no_env);
        assert!(matches!(zero, Err(ConfigError::Invalid(_))));

        let timeout = resolve(&cli(&["--timeout", "0"]), FileConfig::default(), no_env);
        assert!(matches!(timeout, Err(ConfigError::Invalid(_))));

        let negative = resolve(&cli(&["--timeout=-1"]), FileConfig::default(), no_env);
        assert!(matches!(negative, Err(ConfigError::Invalid(_))));

        let url = resolve(&cli(&["--relay-list-url", "nope"]), FileConfig::default(), no_env);
        assert!(matches!(url, Err(ConfigError::RelayListUrl(_))));
    }

    #[test]
    fn test_mode_selection() {
        let config = resolve(&cli(&["--list-cities-in-country", "se"]), FileConfig::default(), no_env)
            .expect("config");
        assert_eq!(config.mode, Mode::ListCitiesInCountry("se".to_string()));

        let config = resolve(&cli(&["--list-providers"]), FileConfig::default(), no_env).expect("config");
        assert_eq!(config.mode, Mode::ListProviders);
    }

    #[test]
    fn test_tcp_method_builds_tcp_prober() {
        let config = resolve(
            &cli(&["--probe-method", "tcp", "--tcp-port", "51820"]),
            FileConfig::default(),
            no_env,
        )
        .expect("config");
        assert!(matches!(config.prober(), ConfiguredProber::Tcp(_)));
        assert_eq!(config.tcp_port, 51820);
    }

    #[test]
    fn test_read_file_config() {
        let path = env::temp_dir().join(format!("relayping-test-{}.yml", std::process::id()));
        std::fs::write(&path, "max_concurrent_pings: 25\nprobe_method: tcp\n").expect("write");
        let config = read_file_config(&path);
        let _ = std::fs::remove_file(&path);

        let config = config.expect("config");
        assert_eq!(config.max_concurrent_pings, 25);
        assert_eq!(config.probe_method, ProbeMethod::Tcp);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = read_file_config(Path::new("/nonexistent/relayping.yml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(parse_file_config("\n").expect("parse"), FileConfig::default());
    }
}
