use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    config::FinderConfig,
    entry::CatalogEntry,
    errors::SearchError,
    search::{search_with, Query},
    source::CatalogSource,
};

/// Searchable union of every registered source.
///
/// Nothing is retrieved until the catalog is first needed. Each search works
/// on an immutable snapshot, so a concurrent `refresh` swaps in new entries
/// without disturbing searches already running.
pub struct Finder {
    sources: Vec<Box<dyn CatalogSource>>,
    catalog: RwLock<Option<Arc<Snapshot>>>,
    config: FinderConfig,
}

/// Entries retrieved per source, indexed like `Finder::sources`, plus their
/// concatenation in source order.
#[derive(Default)]
struct Snapshot {
    by_source: Vec<Arc<Vec<CatalogEntry>>>,
    entries: Arc<Vec<CatalogEntry>>,
}

impl Snapshot {
    fn from_sources(by_source: Vec<Arc<Vec<CatalogEntry>>>) -> Self {
        let entries = by_source.iter().flat_map(|s| s.iter().cloned()).collect();
        Self {
            by_source,
            entries: Arc::new(entries),
        }
    }
}

impl Finder {
    pub fn new(config: FinderConfig) -> Self {
        Self {
            sources: vec![],
            catalog: RwLock::new(None),
            config,
        }
    }

    pub fn with_source(mut self, source: impl CatalogSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Current snapshot, retrieving from the sources on first use.
    pub fn catalog(&self) -> Arc<Vec<CatalogEntry>> {
        if let Some(snapshot) = self.loaded() {
            return snapshot.entries.clone();
        }

        let mut guard = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        // another caller may have loaded it while we waited for the lock
        if let Some(snapshot) = guard.as_ref() {
            return snapshot.entries.clone();
        }
        let snapshot = Arc::new(self.retrieve_all(None));
        *guard = Some(snapshot.clone());
        snapshot.entries.clone()
    }

    /// Retrieve from every source again and replace the snapshot. A source
    /// that fails keeps the entries it returned last time. Returns the number
    /// of entries now in the catalog.
    pub fn refresh(&self) -> usize {
        let previous = self.loaded();
        let snapshot = Arc::new(self.retrieve_all(previous.as_deref()));
        let count = snapshot.entries.len();
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        count
    }

    pub fn search<'q>(&self, query: impl Into<Query<'q>>) -> Result<Vec<CatalogEntry>, SearchError> {
        let catalog = self.catalog();
        let hits = search_with(&catalog, query, &self.config.search_options())?;
        Ok(hits.into_iter().cloned().collect())
    }

    fn loaded(&self) -> Option<Arc<Snapshot>> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn retrieve_all(&self, previous: Option<&Snapshot>) -> Snapshot {
        let mut by_source = Vec::with_capacity(self.sources.len());
        for (idx, source) in self.sources.iter().enumerate() {
            let name = source.name();
            match source.retrieve_entries() {
                Ok(retrieved) => {
                    log::info!("source={name} outcome=success entries={}", retrieved.len());
                    by_source.push(Arc::new(retrieved));
                }
                Err(e) => {
                    let kept: Arc<Vec<CatalogEntry>> = previous
                        .and_then(|p| p.by_source.get(idx))
                        .cloned()
                        .unwrap_or_default();
                    log::warn!("source={name} outcome=error kept={} err={e}", kept.len());
                    by_source.push(kept);
                }
            }
        }
        Snapshot::from_sources(by_source)
    }
}
