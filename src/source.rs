use std::path::PathBuf;

use crate::entry::CatalogEntry;

/// Somewhere catalog entries come from.
///
/// Implementations do their retrieval in `retrieve_entries` only;
/// constructing a source must stay cheap and side-effect free.
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;
    fn retrieve_entries(&self) -> anyhow::Result<Vec<CatalogEntry>>;
}

/// A fixed list of entries held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    entries: Vec<CatalogEntry>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

impl CatalogSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn retrieve_entries(&self) -> anyhow::Result<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }
}

/// Entries read from a CSV file with a `title,source,download` header.
#[derive(Debug, Clone)]
pub struct CsvSource {
    name: String,
    path: PathBuf,
}

impl CsvSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl CatalogSource for CsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn retrieve_entries(&self) -> anyhow::Result<Vec<CatalogEntry>> {
        let mut csv_reader = csv::Reader::from_path(&self.path)?;

        let mut entries = vec![];
        for (idx, record) in csv_reader.deserialize::<CatalogEntry>().enumerate() {
            let entry = record?;
            if entry.title().trim().is_empty() {
                log::debug!("source={} row={} outcome=skip reason=empty-title", self.name, idx + 1);
                continue;
            }
            entries.push(entry);
        }

        log::info!(
            "source={} outcome=success entries={} path={}",
            self.name,
            entries.len(),
            self.path.display()
        );
        Ok(entries)
    }
}
