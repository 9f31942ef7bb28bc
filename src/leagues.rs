use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::raw_table::RawTable;

/// A league as the match logs know it: display name, stats page and the
/// aliases that must be folded so `Team` and `Opponent` agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub country: String,
    pub name: String,
    pub source_url: String,
    #[serde(default)]
    pub alias_map: HashMap<String, String>,
}

/// Team names present only on one side of the fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AliasReport {
    pub only_as_team: Vec<String>,
    pub only_as_opponent: Vec<String>,
}

impl AliasReport {
    pub fn is_clean(&self) -> bool {
        self.only_as_team.is_empty() && self.only_as_opponent.is_empty()
    }
}

impl LeagueConfig {
    fn builtin(country: &str, name: &str, source_url: &str, aliases: &[(&str, &str)]) -> Self {
        Self {
            country: country.to_string(),
            name: name.to_string(),
            source_url: source_url.to_string(),
            alias_map: aliases
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// File-name friendly key, e.g. `premier_league`.
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Rewrites aliased `Team` and `Opponent` cells to their canonical names.
    pub fn canonicalize(&self, table: &mut RawTable) {
        let teams = table.map_column("Team", &self.alias_map);
        let opponents = table.map_column("Opponent", &self.alias_map);
        debug!(
            league = %self.name,
            teams,
            opponents,
            "applied team aliases"
        );
    }

    pub fn with_extra_aliases(mut self, extra: &HashMap<String, String>) -> Self {
        self.alias_map
            .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }
}

static BUILTIN_LEAGUES: Lazy<Vec<LeagueConfig>> = Lazy::new(|| {
    vec![
        LeagueConfig::builtin(
            "England",
            "Premier League",
            "https://fbref.com/en/comps/9/Premier-League-Stats",
            &[
                ("Brighton and Hove Albion", "Brighton"),
                ("Huddersfield Town", "Huddersfield"),
                ("Manchester United", "Manchester Utd"),
                ("Newcastle United", "Newcastle Utd"),
                ("Nottingham Forest", "Nott'ham Forest"),
                ("Sheffield United", "Sheffield Utd"),
                ("Tottenham Hotspur", "Tottenham"),
                ("West Bromwich Albion", "West Brom"),
                ("West Ham United", "West Ham"),
                ("Wolverhampton Wanderers", "Wolves"),
            ],
        ),
        LeagueConfig::builtin(
            "Spain",
            "La Liga",
            "https://fbref.com/en/comps/12/La-Liga-Stats",
            &[
                ("Alaves", "Alavés"),
                ("Almeria", "Almería"),
                ("Atletico Madrid", "Atlético Madrid"),
                ("Cadiz", "Cádiz"),
                ("Leganes", "Leganés"),
                ("Real Betis", "Betis"),
            ],
        ),
        LeagueConfig::builtin(
            "Germany",
            "Bundesliga",
            "https://fbref.com/en/comps/20/Bundesliga-Stats",
            &[
                ("Bayer Leverkusen", "Leverkusen"),
                ("Dusseldorf", "Düsseldorf"),
                ("Eintracht Frankfurt", "Eint Frankfurt"),
                ("Greuther Furth", "Greuther Fürth"),
                ("Koln", "Köln"),
                ("Monchengladbach", "M'Gladbach"),
                ("Nurnberg", "Nürnberg"),
            ],
        ),
        LeagueConfig::builtin(
            "Italy",
            "Serie A",
            "https://fbref.com/en/comps/11/Serie-A-Stats",
            &[("Internazionale", "Inter")],
        ),
        LeagueConfig::builtin(
            "France",
            "Ligue 1",
            "https://fbref.com/en/comps/13/Ligue-1-Stats",
            &[
                ("Nimes", "Nîmes"),
                ("Paris S-G", "Paris Saint-Germain"),
                ("Saint Etienne", "Saint-Étienne"),
            ],
        ),
        LeagueConfig::builtin(
            "Netherlands",
            "Eredivisie",
            "https://fbref.com/en/comps/23/Eredivisie-Stats",
            &[
                ("Go Ahead Eagles", "Go Ahead Eag"),
                ("Sparta Rotterdam", "Sparta R'dam"),
                ("VVV Venlo", "VVV-Venlo"),
            ],
        ),
    ]
});

pub fn builtin_leagues() -> &'static [LeagueConfig] {
    &BUILTIN_LEAGUES
}

/// Looks a league up by display name or slug, ignoring case.
pub fn find_league(name: &str) -> Option<&'static LeagueConfig> {
    let wanted = name.trim().to_lowercase();
    builtin_leagues()
        .iter()
        .find(|l| l.name.to_lowercase() == wanted || l.slug() == wanted)
}

/// Reads `{league name: {alias: canonical}}` overrides.
pub fn load_alias_overrides(path: &Path) -> Result<HashMap<String, HashMap<String, String>>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read alias overrides {}", path.display()))?;
    serde_json::from_str(&raw).context("invalid alias overrides json")
}

pub fn alias_mismatches(table: &RawTable) -> AliasReport {
    let teams = table.distinct("Team");
    let opponents = table.distinct("Opponent");
    AliasReport {
        only_as_team: teams
            .iter()
            .filter(|t| opponents.binary_search(*t).is_err())
            .cloned()
            .collect(),
        only_as_opponent: opponents
            .iter()
            .filter(|o| teams.binary_search(*o).is_err())
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_accepts_name_or_slug() {
        assert_eq!(
            find_league("premier league").map(|l| l.country.as_str()),
            Some("England")
        );
        assert_eq!(
            find_league("serie_a").map(|l| l.name.as_str()),
            Some("Serie A")
        );
        assert!(find_league("MLS").is_none());
    }

    #[test]
    fn mismatches_point_at_missing_aliases() {
        let mut table = RawTable::new(["Team", "Opponent"]);
        table.push_record(&[("Team", "Tottenham Hotspur"), ("Opponent", "Arsenal")]);
        table.push_record(&[("Team", "Arsenal"), ("Opponent", "Tottenham")]);

        let report = alias_mismatches(&table);
        assert_eq!(report.only_as_team, vec!["Tottenham Hotspur"]);
        assert_eq!(report.only_as_opponent, vec!["Tottenham"]);

        find_league("Premier League")
            .expect("builtin league")
            .canonicalize(&mut table);
        assert!(alias_mismatches(&table).is_clean());
    }
}
