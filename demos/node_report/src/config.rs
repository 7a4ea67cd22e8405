//! Scenario configuration file.
//!
//! Paths are resolved against the directory holding the config file.
//! Only the `[node]` table is required; every other analysis runs when
//! its table is present.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use vp_node::NodeEvalConfig;
use vp_segment::link_segment::LINK_MAPPER_SHEET;
use vp_segment::travel_time::TT_MAPPER_SHEET;
use vp_segment::{LinkSegmentConfig, NetworkEvalConfig, TravelTimeConfig};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    /// Prefix of every output table name.
    pub name:          String,
    /// Mapping workbook: a spreadsheet file or a directory of `<sheet>.csv` files.
    pub mapping_dir:   PathBuf,
    pub output_dir:    PathBuf,
    #[serde(default)]
    pub format:        OutputFormat,
    pub node:          NodeSection,
    pub network:       Option<NetworkSection>,
    pub link_segments: Option<LinkSection>,
    pub travel_time:   Option<TravelTimeSection>,
}

#[derive(Debug, Deserialize)]
pub struct NodeSection {
    pub results: PathBuf,
    #[serde(default)]
    pub params:  NodeEvalConfig,
}

#[derive(Debug, Deserialize)]
pub struct NetworkSection {
    pub results: PathBuf,
    #[serde(default)]
    pub params:  NetworkEvalConfig,
}

#[derive(Debug, Deserialize)]
pub struct LinkSection {
    pub results: PathBuf,
    #[serde(default = "default_link_sheet")]
    pub sheet:   String,
    #[serde(default)]
    pub params:  LinkSegmentConfig,
}

#[derive(Debug, Deserialize)]
pub struct TravelTimeSection {
    /// One `.rsr` file per simulation run.
    pub runs:          Vec<PathBuf>,
    /// Data-collection `.mer` files carrying transit occupancy, one per
    /// run.  Read only when `params.occupancy` is set.
    #[serde(default)]
    pub mer:           Vec<PathBuf>,
    #[serde(default = "default_tt_sheet")]
    pub sheet:         String,
    /// Mapper sheet for bus headways.  Defaults to `bus_headway_mapping`
    /// when the workbook has it; no headway table otherwise.
    pub headway_sheet: Option<String>,
    #[serde(default)]
    pub params:        TravelTimeConfig,
}

fn default_link_sheet() -> String {
    LINK_MAPPER_SHEET.to_owned()
}

fn default_tt_sheet() -> String {
    TT_MAPPER_SHEET.to_owned()
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut cfg = Self::from_toml(&text)
            .with_context(|| format!("decoding {}", path.display()))?;
        cfg.resolve(path.parent().unwrap_or(Path::new(".")));
        Ok(cfg)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Make every relative path relative to `base`.
    fn resolve(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        fix(&mut self.mapping_dir);
        fix(&mut self.output_dir);
        fix(&mut self.node.results);
        if let Some(n) = &mut self.network {
            fix(&mut n.results);
        }
        if let Some(l) = &mut self.link_segments {
            fix(&mut l.results);
        }
        if let Some(t) = &mut self.travel_time {
            t.runs.iter_mut().chain(t.mer.iter_mut()).for_each(fix);
        }
    }

    /// Output table name for one analysis.
    pub fn table_name(&self, analysis: &str) -> String {
        format!("{}_{analysis}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name        = "base_am"
mapping_dir = "mapping"
output_dir  = "out"

[node]
results = "node_results.att"
"#;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = ScenarioConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(cfg.format, OutputFormat::Csv);
        assert_eq!(cfg.node.params, NodeEvalConfig::default());
        assert!(cfg.network.is_none() && cfg.link_segments.is_none() && cfg.travel_time.is_none());
        assert_eq!(cfg.table_name("node_eval"), "base_am_node_eval");
    }

    #[test]
    fn node_params_override_defaults() {
        let text = format!(
            "{MINIMAL}
[node.params]
keep_runs  = [\"AVG\", \"1\"]
strictness = \"strict\"
intervals  = [{{ id = \"2700-6300\", label = \"6-7\" }}, {{ id = \"6300-9900\" }}]
"
        );
        let cfg = ScenarioConfig::from_toml(&text).unwrap();
        let p = &cfg.node.params;
        assert_eq!(p.keep_runs, ["AVG", "1"]);
        assert!(p.strictness.is_strict());
        assert_eq!(p.intervals.labels(), ["6-7", "6300-9900"]);
        assert_eq!(p.metrics, NodeEvalConfig::default().metrics);
    }

    #[test]
    fn optional_sections_and_sheet_defaults() {
        let text = format!(
            "format = \"sqlite\"
{MINIMAL}
[link_segments]
results = \"link.att\"

[travel_time]
runs          = [\"tt_001.rsr\", \"/abs/tt_002.rsr\"]
headway_sheet = \"bus_headway_mapping\"
"
        );
        let mut cfg = ScenarioConfig::from_toml(&text).unwrap();
        assert_eq!(cfg.format, OutputFormat::Sqlite);
        assert_eq!(cfg.link_segments.as_ref().unwrap().sheet, LINK_MAPPER_SHEET);
        assert_eq!(cfg.travel_time.as_ref().unwrap().sheet, TT_MAPPER_SHEET);

        cfg.resolve(Path::new("/scen"));
        assert_eq!(cfg.node.results, Path::new("/scen/node_results.att"));
        let runs = &cfg.travel_time.as_ref().unwrap().runs;
        assert_eq!(runs[0], Path::new("/scen/tt_001.rsr"));
        assert_eq!(runs[1], Path::new("/abs/tt_002.rsr"));
    }

    #[test]
    fn travel_time_occupancy_and_mer_files() {
        let text = format!(
            "{MINIMAL}
[travel_time]
runs = [\"tt_001.rsr\"]
mer  = [\"dc_001.mer\"]

[travel_time.params.occupancy]
car_hgv_veh_occupancy = 1.2
measurements          = [3, 4]
"
        );
        let mut cfg = ScenarioConfig::from_toml(&text).unwrap();
        cfg.resolve(Path::new("/scen"));
        let tt = cfg.travel_time.as_ref().unwrap();
        assert_eq!(tt.mer, vec![PathBuf::from("/scen/dc_001.mer")]);
        let occupancy = tt.params.occupancy.as_ref().unwrap();
        assert_eq!(occupancy.car_hgv_veh_occupancy, 1.2);
        assert_eq!(occupancy.transit_min_type, 300);
        assert_eq!(occupancy.measurements, [3, 4]);
    }

    #[test]
    fn missing_node_section_is_an_error() {
        assert!(ScenarioConfig::from_toml("name = \"x\"\nmapping_dir = \"m\"\noutput_dir = \"o\"\n").is_err());
    }
}
