use serde::Deserialize;

use crate::probe::prelude::Candidate;

pub const COUNTRY_CODE: &str = "country_code";
pub const COUNTRY_NAME: &str = "country_name";
pub const CITY_CODE: &str = "city_code";
pub const CITY_NAME: &str = "city_name";
pub const PROVIDER: &str = "provider";
pub const RELAY_TYPE: &str = "type";
pub const ACTIVE: &str = "active";
pub const OWNED: &str = "owned";
pub const IPV4_ADDR: &str = "ipv4_addr_in";

/// One relay entry as published in the provider's relay directory.
/// Only the fields needed to build and filter candidates are kept; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Relay {
    pub hostname: String,

    #[serde(default)]
    pub fqdn: Option<String>,

    #[serde(default)]
    pub country_code: Option<String>,

    #[serde(default)]
    pub country_name: Option<String>,

    #[serde(default)]
    pub city_code: Option<String>,

    #[serde(default)]
    pub city_name: Option<String>,

    #[serde(default)]
    pub provider: Option<String>,

    /// `wireguard`, `openvpn` or `bridge`.
    #[serde(default, rename = "type")]
    pub relay_type: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub owned: Option<bool>,

    #[serde(default)]
    pub ipv4_addr_in: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Relay {
    pub fn is_wireguard(&self) -> bool {
        self.type_contains("wireguard")
    }

    pub fn is_openvpn(&self) -> bool {
        self.type_contains("openvpn")
    }

    fn type_contains(&self, needle: &str) -> bool {
        self.relay_type
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(needle))
    }

    /// The address to probe: the published FQDN, or the hostname under `domain_suffix`.
    pub fn address(&self, domain_suffix: &str) -> String {
        match self.fqdn.as_deref().map(str::trim) {
            Some(fqdn) if !fqdn.is_empty() => fqdn.to_string(),
            _ => {
                let suffix = domain_suffix.trim_matches('.');
                if suffix.is_empty() {
                    self.hostname.clone()
                } else {
                    format!("{}.{}", self.hostname, suffix)
                }
            }
        }
    }

    pub fn to_candidate(&self, domain_suffix: &str) -> Candidate {
        let mut candidate = Candidate::new(self.hostname.clone(), self.address(domain_suffix));

        let text_fields = [
            (COUNTRY_CODE, &self.country_code),
            (COUNTRY_NAME, &self.country_name),
            (CITY_CODE, &self.city_code),
            (CITY_NAME, &self.city_name),
            (PROVIDER, &self.provider),
            (RELAY_TYPE, &self.relay_type),
            (IPV4_ADDR, &self.ipv4_addr_in),
        ];
        for (key, value) in text_fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                candidate = candidate.with_metadata(key, value);
            }
        }

        candidate = candidate.with_metadata(ACTIVE, self.active.to_string());
        if let Some(owned) = self.owned {
            candidate = candidate.with_metadata(OWNED, owned.to_string());
        }
        candidate
    }
}

/// Converts relays to candidates, dropping entries without a hostname and
/// keeping only the first entry for a repeated hostname.
pub fn relays_to_candidates(relays: &[Relay], domain_suffix: &str) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    relays
        .iter()
        .filter(|relay| !relay.hostname.trim().is_empty())
        .filter(|relay| {
            let fresh = seen.insert(relay.hostname.as_str());
            if !fresh {
                log::warn!("Relay {} is listed more than once, keeping the first entry", relay.hostname);
            }
            fresh
        })
        .map(|relay| relay.to_candidate(domain_suffix))
        .collect()
}
