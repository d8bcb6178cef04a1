pub mod client;
pub mod filter;
pub mod listing;
pub mod model;

pub mod prelude {
    pub use super::client::{DEFAULT_RELAY_LIST_URL, DirectoryError, build_client, fetch_relays, parse_relay_list_url};
    pub use super::filter::{RelayFilter, VpnType, filter_candidates};
    pub use super::listing::{CityRow, CountryRow, ServerCounts, list_cities, list_countries, list_providers};
    pub use super::model::{Relay, relays_to_candidates};
}
