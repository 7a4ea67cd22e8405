//! node_report — run the post-processing reports of one VISSIM scenario.
//!
//! ```text
//! RUST_LOG=info node_report data/scenario.toml
//! ```
//!
//! The scenario file names the raw exports, the mapping workbook directory
//! and the output directory; see `data/scenario.toml` for a complete
//! example.  Each configured analysis writes one table.

mod config;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use vp_att::{MappingWorkbook, load_att_path};
use vp_node::NodeEvalPipeline;
use vp_output::{CsvWriter, ReportWriter};
use vp_segment::headway::HEADWAY_MAPPER_SHEET;
use vp_segment::{
    LinkMapping, SegmentLayout, TravelTimeEval, headway_stats, headway_table, link_segment_bins,
    link_segment_table, network_performance,
};

use config::{OutputFormat, ScenarioConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario configuration (TOML).
    config: PathBuf,
}

fn open_writer(cfg: &ScenarioConfig) -> Result<Box<dyn ReportWriter>> {
    match cfg.format {
        OutputFormat::Csv => Ok(Box::new(CsvWriter::new(&cfg.output_dir)?)),
        #[cfg(feature = "sqlite")]
        OutputFormat::Sqlite => Ok(Box::new(vp_output::SqliteWriter::new(&cfg.output_dir)?)),
        #[cfg(not(feature = "sqlite"))]
        OutputFormat::Sqlite => anyhow::bail!("format = \"sqlite\" needs the `sqlite` feature of node_report"),
    }
}

fn run(cfg: &ScenarioConfig) -> Result<()> {
    let workbook = MappingWorkbook::open(&cfg.mapping_dir)
        .with_context(|| format!("opening mapping workbook {}", cfg.mapping_dir.display()))?;
    let mut writer = open_writer(cfg)?;

    // ── Node evaluation ───────────────────────────────────────────────────────
    let pipeline = NodeEvalPipeline::from_workbook(cfg.node.params.clone(), &workbook)
        .context("reading node evaluation mapping sheets")?;
    let node = pipeline
        .run_path(&cfg.node.results)
        .with_context(|| format!("node evaluation of {}", cfg.node.results.display()))?;
    if !node.diagnostics.is_clean() {
        log::warn!(
            "node evaluation: {} unmatched de-duplication rules, {} unmapped directions",
            node.diagnostics.unmatched_rules.len(),
            node.diagnostics.unmapped_directions.len(),
        );
    }
    writer.write_wide(&cfg.table_name("node_eval"), &node.wide)?;

    // ── Network performance ───────────────────────────────────────────────────
    if let Some(section) = &cfg.network {
        let raw = load_att_path(&section.results, cfg.node.params.strictness)
            .with_context(|| format!("loading {}", section.results.display()))?;
        let table = network_performance(&raw, &section.params)?;
        writer.write_table(&cfg.table_name("network_performance"), &table)?;
    }

    // ── Link segments ─────────────────────────────────────────────────────────
    if let Some(section) = &cfg.link_segments {
        let raw = load_att_path(&section.results, cfg.node.params.strictness)
            .with_context(|| format!("loading {}", section.results.display()))?;
        let mapping: Vec<LinkMapping> = workbook
            .sheet(&section.sheet)
            .with_context(|| format!("reading sheet {:?}", section.sheet))?;
        let bins = link_segment_bins(&raw, &mapping, &section.params)?;
        writer.write_table(&cfg.table_name("link_segments"), &link_segment_table(&bins)?)?;
    }

    // ── Travel time and bus headway ───────────────────────────────────────────
    if let Some(section) = &cfg.travel_time {
        let eval = TravelTimeEval::from_workbook(section.params.clone(), &workbook, &section.sheet)
            .with_context(|| format!("reading sheet {:?}", section.sheet))?;
        let tt = eval.run_paths_with_occupancy(&section.runs, &section.mer)?;
        writer.write_wide(&cfg.table_name("travel_time"), &tt.wide)?;

        let headway_sheet = section.headway_sheet.clone().or_else(|| {
            workbook
                .has_sheet(HEADWAY_MAPPER_SHEET)
                .then(|| HEADWAY_MAPPER_SHEET.to_owned())
        });
        if let Some(sheet) = headway_sheet {
            let layout = SegmentLayout::new(
                workbook.sheet(&sheet).with_context(|| format!("reading sheet {sheet:?}"))?,
            );
            let stats = headway_stats(&tt.records, &layout, eval.config());
            writer.write_table(&cfg.table_name("bus_headway"), &headway_table(&stats)?)?;
        }
    }

    writer.finish()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = ScenarioConfig::load(&args.config)?;
    log::info!("scenario {:?}: writing to {}", cfg.name, cfg.output_dir.display());

    let t0 = Instant::now();
    run(&cfg)?;
    log::info!("done in {:.2?}", t0.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn bundled_scenario_writes_node_and_network_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("scenario.toml");
        let mut cfg = ScenarioConfig::load(&path).unwrap();
        cfg.output_dir = dir.path().to_path_buf();

        run(&cfg).unwrap();

        let node = std::fs::read_to_string(dir.path().join("base_am_node_eval.csv")).unwrap();
        let mut lines = node.lines();
        assert!(lines.next().unwrap().starts_with("run,node,approach,direction,from_link,to_link,6:00-7:00 am"));
        assert!(lines.next().unwrap().starts_with(",,,,,,qlen,qlenmax,vehs_all,vehdelay_all,los"));
        assert!(node.lines().any(|l| l.starts_with("AVG,7,,Intersection,,,")));
        assert!(!node.contains("Total"));

        let network = std::fs::read_to_string(dir.path().join("base_am_network_performance.csv")).unwrap();
        assert!(network.contains("6:00-7:00"));
        assert!(!network.contains("2700-6300"));
    }
}
