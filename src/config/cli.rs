use std::path::PathBuf;

use clap::Parser;

use super::model::ProbeMethod;
use crate::relays::prelude::VpnType;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "relayping", version)]
#[command(about = "Ping VPN relays to find the fastest one.")]
pub struct Cli {
    /// Settings file (YAML). Defaults to $CONFIG_FILE, then ./relayping.yml if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Relay directory URL.
    #[arg(long, value_name = "URL")]
    pub relay_list_url: Option<String>,

    /// Maximum number of concurrent pings. Default is 10.
    #[arg(long, value_name = "N")]
    pub max_concurrent_pings: Option<usize>,

    /// Timeout for a single ping, in seconds. Default is 5.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// How each relay is measured.
    #[arg(long, value_enum)]
    pub probe_method: Option<ProbeMethod>,

    /// Port used by the tcp probe method.
    #[arg(long, value_name = "PORT")]
    pub tcp_port: Option<u16>,

    /// Exclude servers from this country code.
    #[arg(long, value_name = "CC")]
    pub exclude_country_code: Option<String>,

    /// Exclude servers from this city code.
    #[arg(long, value_name = "CODE")]
    pub exclude_city_code: Option<String>,

    /// Exclude servers whose city name contains this state abbreviation.
    #[arg(long, value_name = "STATE")]
    pub exclude_state: Option<String>,

    /// Filter servers by provider.
    #[arg(long)]
    pub provider: Option<String>,

    /// Filter servers by country code. Can specify multiple.
    #[arg(long, value_name = "CC", num_args = 1..)]
    pub country_code: Vec<String>,

    /// Filter servers by city code. Can specify multiple.
    #[arg(long, value_name = "CODE", num_args = 1..)]
    pub city_code: Vec<String>,

    /// Filter servers by VPN type.
    #[arg(long, value_enum)]
    pub vpn_type: Option<VpnType>,

    /// Also probe relays the directory marks as inactive.
    #[arg(long)]
    pub include_inactive: bool,

    /// Show the next fastest servers and choose one interactively.
    #[arg(long)]
    pub show_next_fastest: bool,

    /// List all available countries.
    #[arg(long)]
    pub list_countries: bool,

    /// List all available cities.
    #[arg(long)]
    pub list_cities: bool,

    /// List all cities in the specified country code.
    #[arg(long, value_name = "CC")]
    pub list_cities_in_country: Option<String>,

    /// List all server providers.
    #[arg(long)]
    pub list_providers: bool,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filters() {
        let cli = Cli::try_parse_from([
            "relayping",
            "--country-code",
            "se",
            "no",
            "--vpn-type",
            "wg",
            "--max-concurrent-pings",
            "4",
            "--probe-method",
            "tcp",
        ])
        .expect("parse");

        assert_eq!(cli.country_code, vec!["se", "no"]);
        assert_eq!(cli.vpn_type, Some(VpnType::Wg));
        assert_eq!(cli.max_concurrent_pings, Some(4));
        assert_eq!(cli.probe_method, Some(ProbeMethod::Tcp));
        assert!(!cli.show_next_fastest);
    }

    #[test]
    fn test_rejects_unknown_vpn_type() {
        assert!(Cli::try_parse_from(["relayping", "--vpn-type", "ipsec"]).is_err());
    }
}
