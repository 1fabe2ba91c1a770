//! JSON persistence for the user lexicon layer.

use crate::core::error::AkiError;
use crate::core::lexicon::Lexicon;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DictionaryStore {
    path: PathBuf,
}

/// How [`DictionaryStore::import`] combines the file with the current layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    Merge,
    Replace,
}

impl DictionaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lexicon with the stored user layer. A missing file is an empty layer;
    /// an unreadable or corrupt one is logged and treated as empty.
    pub fn load(&self) -> Lexicon {
        match read_terms(&self.path) {
            Ok(terms) => Lexicon::with_user_terms(terms),
            Err(AkiError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Lexicon::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not load user dictionary");
                Lexicon::new()
            }
        }
    }

    pub fn save(&self, lexicon: &Lexicon) -> Result<(), AkiError> {
        write_terms(&self.path, lexicon.user_terms())?;
        tracing::debug!(
            path = %self.path.display(),
            terms = lexicon.user_terms().len(),
            "user dictionary saved"
        );
        Ok(())
    }

    /// Load terms from `source` into the lexicon and persist the result.
    /// Returns the number of terms read from `source`.
    pub fn import(
        &self,
        lexicon: &mut Lexicon,
        source: &Path,
        mode: ImportMode,
    ) -> Result<usize, AkiError> {
        let terms = read_terms(source)?;
        let count = terms.len();
        match mode {
            ImportMode::Merge => lexicon.merge(terms),
            ImportMode::Replace => lexicon.replace(terms),
        }
        self.save(lexicon)?;
        Ok(count)
    }
}

/// Write the merged dictionary (core plus user) to `dest`.
pub fn export(lexicon: &Lexicon, dest: &Path) -> Result<usize, AkiError> {
    let all = lexicon.to_map();
    write_terms(dest, &all)?;
    Ok(all.len())
}

fn read_terms(path: &Path) -> Result<BTreeMap<String, String>, AkiError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_terms(path: &Path, terms: &BTreeMap<String, String>) -> Result<(), AkiError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(terms)?)?;
    Ok(())
}
