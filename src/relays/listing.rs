use std::collections::BTreeMap;

use super::model::Relay;

/// Number of WireGuard and OpenVPN relays in one location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerCounts {
    pub wireguard: usize,
    pub openvpn: usize,
}

impl ServerCounts {
    fn add(&mut self, relay: &Relay) {
        if relay.is_wireguard() {
            self.wireguard += 1;
        }
        if relay.is_openvpn() {
            self.openvpn += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryRow {
    pub country_name: String,
    pub country_code: String,
    pub counts: ServerCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityRow {
    pub city_name: String,
    pub city_code: String,
    pub country_name: String,
    pub country_code: String,
    pub counts: ServerCounts,
}

/// All countries, sorted by name then code.
pub fn list_countries(relays: &[Relay]) -> Vec<CountryRow> {
    let mut rows: BTreeMap<(String, String), ServerCounts> = BTreeMap::new();
    for relay in relays {
        if let (Some(name), Some(code)) = (&relay.country_name, &relay.country_code) {
            rows.entry((name.clone(), code.clone()))
                .or_default()
                .add(relay);
        }
    }

    rows.into_iter()
        .map(|((country_name, country_code), counts)| CountryRow {
            country_name,
            country_code,
            counts,
        })
        .collect()
}

/// All cities, optionally restricted to one country code (case-insensitive).
pub fn list_cities(relays: &[Relay], country_code: Option<&str>) -> Vec<CityRow> {
    let wanted = country_code.map(str::to_lowercase);
    let mut rows: BTreeMap<(String, String, String, String), ServerCounts> = BTreeMap::new();

    for relay in relays {
        let (Some(city_name), Some(city_code)) = (&relay.city_name, &relay.city_code) else {
            continue;
        };
        let relay_country = relay.country_code.clone().unwrap_or_default();
        if let Some(wanted) = &wanted {
            if relay_country.to_lowercase() != *wanted {
                continue;
            }
        }

        let key = (
            city_name.clone(),
            city_code.clone(),
            relay.country_name.clone().unwrap_or_default(),
            relay_country,
        );
        rows.entry(key).or_default().add(relay);
    }

    rows.into_iter()
        .map(|((city_name, city_code, country_name, country_code), counts)| CityRow {
            city_name,
            city_code,
            country_name,
            country_code,
            counts,
        })
        .collect()
}

/// Distinct providers, sorted.
pub fn list_providers(relays: &[Relay]) -> Vec<String> {
    let mut providers: Vec<String> = relays
        .iter()
        .filter_map(|relay| relay.provider.clone())
        .filter(|provider| !provider.is_empty())
        .collect();
    providers.sort();
    providers.dedup();
    providers
}
