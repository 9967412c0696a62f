use serde::{Deserialize, Serialize};
use std::{fmt, hash::Hash};

use crate::normalize::normalize;

/// One listing retrieved from a catalog source.
///
/// The title is stored in normalized form. Identity is the title alone, so
/// the same album listed by two sources compares equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "EntryRecord")]
pub struct CatalogEntry {
    title: String,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    download: Option<String>,

    #[serde(skip)]
    folded_title: String,
}

#[derive(Deserialize)]
struct EntryRecord {
    title: String,
    source: String,
    #[serde(default)]
    download: Option<String>,
}

impl From<EntryRecord> for CatalogEntry {
    fn from(record: EntryRecord) -> Self {
        let entry = CatalogEntry::new(record.title, record.source);
        match record.download {
            Some(download) if !download.trim().is_empty() => entry.with_download(download),
            _ => entry,
        }
    }
}

impl CatalogEntry {
    pub fn new(title: impl AsRef<str>, source: impl Into<String>) -> Self {
        let title = normalize(title.as_ref());
        let folded_title = title.to_lowercase();
        Self {
            title,
            source: source.into(),
            download: None,
            folded_title,
        }
    }

    pub fn with_download(mut self, download: impl Into<String>) -> Self {
        self.download = Some(download.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Where the entry was listed.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the entry can be acquired from, if the source said so.
    pub fn download(&self) -> Option<&str> {
        self.download.as_deref()
    }

    pub(crate) fn folded_title(&self) -> &str {
        &self.folded_title
    }
}

impl Hash for CatalogEntry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.title.hash(state)
    }
}

impl PartialEq for CatalogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
    }
}

impl Eq for CatalogEntry {}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.source)?;
        if let Some(download) = &self.download {
            write!(f, " [{download}]")?;
        }
        Ok(())
    }
}
