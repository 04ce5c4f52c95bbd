use std::path::{Path, PathBuf};

use log::{error, info};

use crate::data::loader::load_file;
use crate::error::ProcessError;
use crate::options::PlotOptions;
use crate::plan::{plan_chart, ChartPlan};

// ---------------------------------------------------------------------------
// Renderer seam
// ---------------------------------------------------------------------------

/// Chart artifacts written for one export, next to the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub pdf: PathBuf,
    pub png: PathBuf,
}

impl OutputPaths {
    pub fn for_input(input: &Path) -> Self {
        Self {
            pdf: input.with_extension("pdf"),
            png: input.with_extension("png"),
        }
    }
}

/// Draws a [`ChartPlan`] to the given outputs.
pub trait ChartRenderer {
    fn render(&mut self, plan: &ChartPlan, outputs: &OutputPaths) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Parse, label and render one export.
///
/// Nothing is rendered unless every step before it succeeded.
pub fn process_file(
    path: &Path,
    options: &PlotOptions,
    renderer: &mut dyn ChartRenderer,
) -> Result<OutputPaths, ProcessError> {
    info!("Processing file: {}", path.display());

    let channels = load_file(path)?;
    let plan = plan_chart(&channels, options)?;
    let outputs = OutputPaths::for_input(path);
    renderer
        .render(&plan, &outputs)
        .map_err(ProcessError::Render)?;

    info!("Output: {} and {}", outputs.pdf.display(), outputs.png.display());
    Ok(outputs)
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<OutputPaths>,
    pub failed: Vec<(PathBuf, ProcessError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Error naming the failed files, if there are any.
    pub fn ensure_success(&self) -> anyhow::Result<()> {
        if self.is_success() {
            return Ok(());
        }
        let names: Vec<String> = self
            .failed
            .iter()
            .map(|(path, _)| path.display().to_string())
            .collect();
        anyhow::bail!(
            "{} of {} files failed: {}",
            self.failed.len(),
            self.failed.len() + self.rendered.len(),
            names.join(", ")
        )
    }
}

/// Process every file independently. A failing file is logged and recorded;
/// the rest of the batch still runs.
pub fn process_batch<P: AsRef<Path>>(
    paths: &[P],
    options: &PlotOptions,
    renderer: &mut dyn ChartRenderer,
) -> BatchReport {
    let mut report = BatchReport::default();
    for path in paths {
        let path = path.as_ref();
        match process_file(path, options, renderer) {
            Ok(outputs) => report.rendered.push(outputs),
            Err(err) => {
                error!("{}: {err}", path.display());
                report.failed.push((path.to_path_buf(), err));
            }
        }
    }
    info!(
        "{} rendered, {} failed",
        report.rendered.len(),
        report.failed.len()
    );
    report
}
