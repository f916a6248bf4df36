use pattern_combiner::config::combine::load_config;
use pattern_combiner::io::{write_json_file, EventFile};
use pattern_combiner::{CombinedPattern, CombineReport, PatternCombiner};
use serde::Serialize;
use std::env;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoOutput<'a, 'h> {
    patterns: &'a [CombinedPattern<'h>],
    report: &'a CombineReport,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args();
    let program = args
        .next()
        .unwrap_or_else(|| "combine_demo".to_string());
    let config_path = args
        .next()
        .ok_or_else(|| format!("Usage: {program} <config.json>"))?;

    let config = load_config(Path::new(&config_path))?;
    let params = config.resolve();
    let event = EventFile::load(&config.input)?;
    let inputs = event.resolve()?;

    let combiner = PatternCombiner::new(params);
    let (patterns, report) =
        combiner.combine_with_report(&inputs.eta, &inputs.phi, &inputs.association)?;

    if config.output.format.includes_text() {
        report.print_text_summary();
        for (i, road) in patterns.iter().enumerate() {
            println!(
                "  road {i}: hits={} chambers={} has_phi={} pos=({:.1}, {:.1}, {:.1})",
                road.len(),
                road.hits_by_chamber().len(),
                road.has_phi,
                road.position.x,
                road.position.y,
                road.position.z
            );
        }
    }

    if config.output.format.includes_json() {
        if let Some(path) = &config.output.json_out {
            let output = DemoOutput {
                patterns: &patterns,
                report: &report,
            };
            write_json_file(path, &output)?;
            println!("JSON report written to {}", path.display());
        }
    }
    Ok(())
}
