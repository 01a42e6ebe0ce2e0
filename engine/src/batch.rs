//! Analysing many nodes at once.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use crate::catalogue::CatalogueCache;
use crate::config::AnalyserConfig;
use crate::error::{AnalyseError, Result};
use crate::registry::CheckRegistry;
use crate::session::{NodeReport, ParseSession};

/// One transcript and the node it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInput {
    pub node_name: String,
    pub text: String,
}

impl NodeInput {
    pub fn new(node_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            text: text.into(),
        }
    }

    /// Reads a transcript file; the node name is the file stem.
    ///
    /// Transcripts are not always clean UTF-8, so invalid bytes are replaced
    /// rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyseError::Io`] if the file cannot be read.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AnalyseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let node_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(node_name, String::from_utf8_lossy(&bytes)))
    }
}

/// Reads every transcript, failing on the first unreadable file.
pub fn read_inputs(paths: &[PathBuf]) -> Result<Vec<NodeInput>> {
    paths.iter().map(NodeInput::read).collect()
}

/// Analyses `inputs` in parallel, returning reports in input order.
///
/// All nodes share `cache`, so each distinct alarm catalogue is loaded once
/// per run. `config.jobs` bounds the worker count; `None` or `0` uses the
/// rayon default.
///
/// # Errors
///
/// Returns [`AnalyseError::ThreadPool`] if the worker pool cannot start.
pub fn analyse_nodes(
    registry: &CheckRegistry,
    cache: &CatalogueCache,
    config: &AnalyserConfig,
    inputs: &[NodeInput],
) -> Result<Vec<NodeReport>> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = config.jobs.filter(|jobs| *jobs > 0) {
        builder = builder.num_threads(jobs);
    }
    let pool = builder.build()?;

    let session = ParseSession::new(registry, cache, config);
    let reports = pool.install(|| {
        inputs
            .par_iter()
            .map(|input| session.analyse(&input.node_name, &input.text))
            .collect::<Vec<_>>()
    });

    info!(
        nodes = reports.len(),
        catalogue_loads = cache.loads(),
        "Batch analysis complete"
    );
    Ok(reports)
}
