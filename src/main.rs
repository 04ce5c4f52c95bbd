use std::path::PathBuf;

use akta_traces::{
    process_batch, process_file, ChartPlan, ChartRenderer, OutputPaths, PlotOptions,
};
use anyhow::{bail, Result};
use log::info;

/// Environment variable naming a JSON file with [`PlotOptions`].
const OPTIONS_ENV: &str = "AKTA_TRACES_OPTIONS";

/// Reports each plan through the log instead of drawing it.
struct LogRenderer;

impl ChartRenderer for LogRenderer {
    fn render(&mut self, plan: &ChartPlan, outputs: &OutputPaths) -> Result<()> {
        info!(
            "{}: {:.2}..{:.2} mL (ticks every {}), {} UV points, {} overlays",
            outputs.pdf.with_extension("").display(),
            plan.window.min,
            plan.window.max,
            plan.tick_spacing,
            plan.uv.len(),
            plan.overlays.len()
        );
        if let Some(digital) = &plan.digital {
            info!(
                "  {} digital fractions ({}), scan ended {:?}",
                digital.labeling.len(),
                digital.labeling.wells().join(" "),
                digital.labeling.end()
            );
        }
        for entry in &plan.log_entries {
            info!("  log {:>8.2} mL  {}", entry.position, entry.label);
        }
        if let Some((x, y)) = plan.uv_max {
            info!("  UV maximum {y:.1} mAU at {x:.2} mL");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let options = match std::env::var_os(OPTIONS_ENV) {
        Some(path) => PlotOptions::from_json_file(&PathBuf::from(path))?,
        None => PlotOptions::default(),
    };
    let files: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();

    match files.as_slice() {
        [] => bail!("no export files given"),
        [single] => {
            process_file(single, &options, &mut LogRenderer)?;
        }
        many => {
            process_batch(many, &options, &mut LogRenderer).ensure_success()?;
        }
    }
    Ok(())
}
