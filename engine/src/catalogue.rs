//! Alarm reference catalogue with a load-once cache.
//!
//! The catalogue is a delimited text export of the vendor's alarm table:
//! tab-separated (or comma-separated when a line has no tab), with a header
//! row whose first cell reads `specificProblem`. Every following row with a
//! non-empty first cell becomes one [`AlarmRecord`].
//!
//! ```text
//! specificProblem	eventType	probableCause	perceivedSeverity	managedObject	RNCNodeType
//! NbapLinkDown	Communications	LinkFailure	Major	IubLink	RNC
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use node_health_core::{AlarmRecord, normalize_problem};
use tracing::{debug, info};

use crate::error::CatalogueError;

const HEADER_MARKER: &str = "specificproblem";

/// In-memory alarm catalogue keyed by normalised specific problem.
#[derive(Debug, Clone, Default)]
pub struct AlarmCatalogue {
    records: HashMap<String, AlarmRecord>,
}

impl AlarmCatalogue {
    /// Builds a catalogue from records; the first record of each problem wins.
    pub fn from_records(records: impl IntoIterator<Item = AlarmRecord>) -> Self {
        let mut map = HashMap::new();
        for record in records {
            map.entry(record.key()).or_insert(record);
        }
        Self { records: map }
    }

    /// Parses a delimited table. Returns `None` when no header row exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use node_health_engine::catalogue::AlarmCatalogue;
    ///
    /// let table = "Alarm list\nspecificProblem\teventType\tprobableCause\tperceivedSeverity\n\
    ///              NbapLinkDown\tComms\tLinkFailure\tMajor\n";
    /// let catalogue = AlarmCatalogue::parse(table).unwrap();
    /// assert_eq!(catalogue.lookup(" nbaplinkdown").unwrap().perceived_severity, "Major");
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let mut header_found = false;
        let mut records = Vec::new();

        for line in text.lines() {
            let cells = split_row(line);
            let first = cells.first().copied().unwrap_or_default();
            if header_found {
                if !first.is_empty() {
                    records.push(AlarmRecord::from_columns(&cells));
                }
            } else if first.to_lowercase() == HEADER_MARKER {
                header_found = true;
            }
        }

        header_found.then(|| Self::from_records(records))
    }

    /// Reads and parses a catalogue file.
    ///
    /// # Errors
    ///
    /// [`CatalogueError::Unavailable`] when the file does not exist,
    /// [`CatalogueError::Io`] when it cannot be read, and
    /// [`CatalogueError::MissingHeader`] when it has no header row.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogueError::Unavailable {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).ok_or_else(|| CatalogueError::MissingHeader {
            path: path.to_path_buf(),
        })
    }

    /// Case-insensitive, whitespace-trimmed lookup by specific problem.
    pub fn lookup(&self, specific_problem: &str) -> Option<&AlarmRecord> {
        self.records.get(&normalize_problem(specific_problem))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn split_row(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches('\r');
    let delimiter = if line.contains('\t') { '\t' } else { ',' };
    line.split(delimiter)
        .map(|cell| cell.trim().trim_matches('"').trim())
        .collect()
}

#[derive(Debug)]
struct CachedCatalogue {
    path: PathBuf,
    catalogue: Arc<AlarmCatalogue>,
}

/// Holds the most recently loaded catalogue.
///
/// A lookup with the current path returns the cached catalogue; any other
/// path triggers a fresh load that replaces it. The lock is held for the
/// duration of a load, so concurrent callers asking for the same path load
/// it once and then share it.
#[derive(Debug, Default)]
pub struct CatalogueCache {
    current: Mutex<Option<CachedCatalogue>>,
    loads: AtomicUsize,
}

impl CatalogueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the catalogue for `path`, loading it on a cache miss.
    ///
    /// A failed load leaves the current entry untouched.
    pub fn get(&self, path: &Path) -> Result<Arc<AlarmCatalogue>, CatalogueError> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = current.as_ref().filter(|cached| cached.path == path) {
            debug!(path = %path.display(), "Alarm catalogue cache hit");
            return Ok(Arc::clone(&cached.catalogue));
        }

        let catalogue = Arc::new(AlarmCatalogue::load(path)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(path = %path.display(), records = catalogue.len(), "Loaded alarm catalogue");

        *current = Some(CachedCatalogue {
            path: path.to_path_buf(),
            catalogue: Arc::clone(&catalogue),
        });
        Ok(catalogue)
    }

    /// Path of the catalogue currently cached.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|cached| cached.path.clone())
    }

    /// Number of successful loads performed so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Alarms and events
specificProblem\teventType\tprobableCause\tperceivedSeverity\tmanagedObject\tRNCNodeType
NbapLinkDown\tCommunications\tLinkFailure\tMajor\tIubLink\tRNC
\tignored\trow\twithout\tproblem\tname
CriticalProblemX\tEquipment\tHwFailure\tCritical\tSlot\tRNC
nbaplinkdown\tduplicate\tentry\tMinor\tIubLink\tRNC
";

    #[test]
    fn test_parse_skips_rows_before_header_and_blank_problems() {
        let catalogue = AlarmCatalogue::parse(TABLE).unwrap();
        assert_eq!(catalogue.len(), 2);
        let nbap = catalogue.lookup("NBAPLINKDOWN").unwrap();
        assert_eq!(nbap.perceived_severity, "Major");
        assert_eq!(nbap.node_type, "RNC");
        assert!(catalogue.lookup("Alarms and events").is_none());
    }

    #[test]
    fn test_parse_comma_separated() {
        let catalogue =
            AlarmCatalogue::parse(" SpecificProblem ,eventType\r\n\"LinkDown\",x,y,Warning\r\n").unwrap();
        assert_eq!(catalogue.lookup("linkdown").unwrap().perceived_severity, "Warning");
    }

    #[test]
    fn test_parse_without_header() {
        assert!(AlarmCatalogue::parse("a\tb\nc\td\n").is_none());
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let err = AlarmCatalogue::load("/nonexistent/Alarms_and_events.tsv").unwrap_err();
        assert!(matches!(err, CatalogueError::Unavailable { .. }));
    }

    #[test]
    fn test_cache_loads_once_per_path_and_evicts_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.tsv");
        let second = dir.path().join("second.tsv");
        std::fs::write(&first, TABLE).unwrap();
        std::fs::write(&second, "specificProblem\nOther\t\t\tMinor\n").unwrap();

        let cache = CatalogueCache::new();
        let a = cache.get(&first).unwrap();
        let b = cache.get(&first).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.loads(), 1);

        let c = cache.get(&second).unwrap();
        assert_eq!(cache.loads(), 2);
        assert_eq!(c.len(), 1);
        assert_eq!(cache.current_path().as_deref(), Some(second.as_path()));

        // The first catalogue is no longer current: asking again reloads it.
        cache.get(&first).unwrap();
        assert_eq!(cache.loads(), 3);
    }

    #[test]
    fn test_cache_failure_keeps_current_entry() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.tsv");
        std::fs::write(&first, TABLE).unwrap();

        let cache = CatalogueCache::new();
        cache.get(&first).unwrap();
        assert!(cache.get(&dir.path().join("missing.tsv")).is_err());
        assert_eq!(cache.current_path().as_deref(), Some(first.as_path()));
        cache.get(&first).unwrap();
        assert_eq!(cache.loads(), 1);
    }
}
