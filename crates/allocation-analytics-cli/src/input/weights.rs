use allocation_analytics_core::{ColumnLabel, WeightProfile, WeightTable};
use serde::Deserialize;

use crate::input;

/// Accepted weight file layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WeightsFile {
    /// Allocation grid: `{ "rows": [{class, asset}], "profiles": [{name, percents}] }`
    Table(WeightTable),
    /// `[{ "name": ..., "weights": [{asset, percent}] }]`
    List(Vec<WeightProfile>),
    /// `{ "profiles": [{ "name": ..., "weights": [...] }] }`
    Wrapped { profiles: Vec<WeightProfile> },
}

impl WeightsFile {
    pub fn into_profiles(self) -> Result<Vec<WeightProfile>, Box<dyn std::error::Error>> {
        match self {
            WeightsFile::Table(table) => Ok(table.profiles()?),
            WeightsFile::List(profiles) | WeightsFile::Wrapped { profiles } => Ok(profiles),
        }
    }

    /// Grid view; profile lists become flat rows, one per distinct asset.
    pub fn into_table(self) -> WeightTable {
        match self {
            WeightsFile::Table(table) => table,
            WeightsFile::List(profiles) | WeightsFile::Wrapped { profiles } => {
                let mut assets: Vec<String> = Vec::new();
                for w in profiles.iter().flat_map(|p| p.weights.iter()) {
                    if !assets.contains(&w.asset) {
                        assets.push(w.asset.clone());
                    }
                }
                let labels: Vec<ColumnLabel> = assets.iter().map(ColumnLabel::flat).collect();
                let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
                let mut table = WeightTable::default_for(&labels, &names);
                for (column, profile) in table.profiles.iter_mut().zip(profiles.iter()) {
                    for w in &profile.weights {
                        if let Some(i) = assets.iter().position(|a| *a == w.asset) {
                            column.percents[i] += w.percent;
                        }
                    }
                }
                table
            }
        }
    }
}

/// Load weights from `path`, or from JSON piped on stdin when no path is given.
pub fn load_weights(path: &Option<String>) -> Result<WeightsFile, Box<dyn std::error::Error>> {
    if let Some(ref p) = path {
        input::file::read_structured(p)
    } else if let Some(file) = input::stdin::read_stdin()? {
        Ok(file)
    } else {
        Err("Provide --weights <file> or pipe weights JSON via stdin".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_grid_layout() {
        let json = r#"{
            "rows": [{"class": "Equity", "asset": "S&P 500"}, {"class": "Cash", "asset": "T-Bill"}],
            "profiles": [{"name": "Moderate", "percents": [60, 40]}]
        }"#;
        let file: WeightsFile = serde_json::from_str(json).unwrap();
        let profiles = file.into_profiles().unwrap();
        assert_eq!(profiles[0].weights[0].asset, "S&P 500");
        assert_eq!(profiles[0].weights[1].percent, dec!(40));
    }

    #[test]
    fn test_parses_profile_list_and_builds_grid() {
        let json = r#"[
            {"name": "A", "weights": [{"asset": "Equity", "percent": "70"}, {"asset": "Bonds", "percent": "30"}]},
            {"name": "B", "weights": [{"asset": "Bonds", "percent": "100"}]}
        ]"#;
        let file: WeightsFile = serde_json::from_str(json).unwrap();
        let table = file.into_table();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.profiles[1].percents, vec![Decimal::ZERO, dec!(100)]);
    }
}
