use crate::probe::prelude::Candidate;

use super::model::{ACTIVE, CITY_CODE, CITY_NAME, COUNTRY_CODE, PROVIDER, RELAY_TYPE};

/// Keeps the candidates for which `predicate` holds, preserving order.
pub fn filter_candidates<F>(candidates: Vec<Candidate>, predicate: F) -> Vec<Candidate>
where
    F: Fn(&Candidate) -> bool,
{
    candidates.into_iter().filter(|c| predicate(c)).collect()
}

/// VPN protocol a relay serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VpnType {
    /// WireGuard
    Wg,
    /// OpenVPN
    Ovpn,
}

impl VpnType {
    fn type_fragment(self) -> &'static str {
        match self {
            VpnType::Wg => "wireguard",
            VpnType::Ovpn => "openvpn",
        }
    }
}

/// Metadata predicates applied to candidates before probing.
/// All comparisons are case-insensitive; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayFilter {
    pub provider: Option<String>,
    pub country_codes: Vec<String>,
    pub city_codes: Vec<String>,
    pub exclude_country_code: Option<String>,
    pub exclude_city_code: Option<String>,
    /// Excludes relays whose city name contains this text, e.g. a US state abbreviation.
    pub exclude_state: Option<String>,
    pub vpn_type: Option<VpnType>,
    pub include_inactive: bool,
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl RelayFilter {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if !self.include_inactive && candidate.meta(ACTIVE) == "false" {
            return false;
        }
        if let Some(provider) = &self.provider {
            if !eq_ignore_case(candidate.meta(PROVIDER), provider) {
                return false;
            }
        }
        if let Some(code) = &self.exclude_country_code {
            if eq_ignore_case(candidate.meta(COUNTRY_CODE), code) {
                return false;
            }
        }
        if let Some(code) = &self.exclude_city_code {
            if eq_ignore_case(candidate.meta(CITY_CODE), code) {
                return false;
            }
        }
        if let Some(state) = &self.exclude_state {
            if candidate
                .meta(CITY_NAME)
                .to_lowercase()
                .contains(&state.to_lowercase())
            {
                return false;
            }
        }
        if !self.country_codes.is_empty()
            && !self
                .country_codes
                .iter()
                .any(|code| eq_ignore_case(candidate.meta(COUNTRY_CODE), code))
        {
            return false;
        }
        if !self.city_codes.is_empty()
            && !self
                .city_codes
                .iter()
                .any(|code| eq_ignore_case(candidate.meta(CITY_CODE), code))
        {
            return false;
        }
        if let Some(vpn_type) = self.vpn_type {
            if !candidate
                .meta(RELAY_TYPE)
                .to_lowercase()
                .contains(vpn_type.type_fragment())
            {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let before = candidates.len();
        let kept = filter_candidates(candidates, |c| self.matches(c));
        log::info!("Filtering kept {} of {} relays", kept.len(), before);
        kept
    }
}
