use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use optreg_store::{Store, StoreDefinition};
use tracing::debug;

use crate::config::{Format, PersistConfig};
use crate::document::StoreDocument;
use crate::error::{PersistError, PersistResult};

/// Write `store` to `path`.
pub fn save(store: &Store, path: &Path, config: &PersistConfig) -> PersistResult<()> {
    let document = StoreDocument::from_store(store, config)?;
    write_document(&document, path, config.format)?;
    debug!(store = store.name(), path = %path.display(), "saved store");
    Ok(())
}

/// Read a store previously written by [`save`].
pub fn load(
    path: &Path,
    definition: &Arc<StoreDefinition>,
    config: &PersistConfig,
) -> PersistResult<Store> {
    let store = read_document(path, config.format)?.into_store(definition, config)?;
    debug!(
        path = %path.display(),
        definition = definition.name(),
        values = store.len(),
        "loaded store"
    );
    Ok(store)
}

/// Write a document to `path`.
///
/// The text goes to a temporary file in the same directory which is then
/// renamed over `path`, so readers never see a partial file.
pub fn write_document(document: &StoreDocument, path: &Path, format: Format) -> PersistResult<()> {
    let text = document.render(format)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| PersistError::Io(e.error))?;

    debug!(path = %path.display(), ?format, bytes = text.len(), "wrote document");
    Ok(())
}

/// Read a document from `path` without decoding its values.
pub fn read_document(path: &Path, format: Format) -> PersistResult<StoreDocument> {
    let text = fs::read_to_string(path)?;
    StoreDocument::parse(&text, format)
}
