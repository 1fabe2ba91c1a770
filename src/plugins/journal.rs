//! Append-only conversation journal.
//!
//! One JSON record per line. With `log_encrypted` each line is instead the
//! hex encoding of the JSON XOR-ed with a repeating SHA-256 key. That is
//! obfuscation for casual reading, not encryption: the key is fixed and
//! public.
//!
//! Appends from every `Journal` in the process go through one lock so
//! concurrent sessions never interleave partial lines.

use crate::core::collaborators::LogSink;
use crate::core::config::AkiConfig;
use crate::core::error::AkiError;
use crate::core::record::LogEntry;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Entries kept in memory for [`Journal::recent`].
pub const RECENT_CAPACITY: usize = 100;

static KEY: LazyLock<[u8; 32]> = LazyLock::new(|| Sha256::digest(b"aki_log_key").into());

static APPEND_LOCK: Mutex<()> = Mutex::new(());

fn xor_with_key(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(KEY.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

pub fn obfuscate(plain: &str) -> String {
    hex::encode(xor_with_key(plain.as_bytes()))
}

/// Inverse of [`obfuscate`]; `None` for anything that is not a valid line.
pub fn reveal(line: &str) -> Option<String> {
    let bytes = hex::decode(line.trim()).ok()?;
    String::from_utf8(xor_with_key(&bytes)).ok()
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JournalStats {
    pub total_entries: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_persona: BTreeMap<String, usize>,
    pub first: Option<String>,
    pub last: Option<String>,
}

#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    encrypted: bool,
    recent: Mutex<VecDeque<LogEntry>>,
}

impl Journal {
    /// Open (creating if needed) the journal file.
    pub fn open(path: impl Into<PathBuf>, encrypted: bool) -> Result<Self, AkiError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            encrypted,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY)),
        })
    }

    pub fn from_config(config: &AkiConfig) -> Result<Self, AkiError> {
        Self::open(&config.log_file, config.log_encrypted)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn encode(&self, entry: &LogEntry) -> Result<String, AkiError> {
        let json = serde_json::to_string(entry)?;
        Ok(if self.encrypted { obfuscate(&json) } else { json })
    }

    /// Decode one stored line, accepting either form so a journal whose
    /// `log_encrypted` setting changed stays readable.
    fn decode(&self, line: &str) -> Option<LogEntry> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let plain = if self.encrypted {
            reveal(line).or_else(|| Some(line.to_string()))
        } else if line.starts_with('{') {
            Some(line.to_string())
        } else {
            reveal(line)
        }?;
        serde_json::from_str(&plain).ok()
    }

    /// Formatted one-liners for the last `count` entries appended by this
    /// process.
    pub fn recent(&self, count: usize) -> Vec<String> {
        let recent = lock(&self.recent);
        let skip = recent.len().saturating_sub(count);
        recent.iter().skip(skip).map(LogEntry::display_line).collect()
    }

    /// Entries on disk, oldest first. Lines that do not decode are skipped.
    pub fn read(&self, last_n: Option<usize>) -> Result<Vec<LogEntry>, AkiError> {
        let content = fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        let skip = last_n.map_or(0, |n| lines.len().saturating_sub(n));
        let mut skipped = 0usize;
        let entries: Vec<LogEntry> = lines[skip..]
            .iter()
            .filter_map(|l| {
                let e = self.decode(l);
                if e.is_none() {
                    skipped += 1;
                }
                e
            })
            .collect();
        if skipped > 0 {
            tracing::debug!(skipped, path = %self.path.display(), "undecodable journal lines");
        }
        Ok(entries)
    }

    /// Entries whose JSON form contains `query`, case-insensitively.
    pub fn search(&self, query: &str) -> Result<Vec<LogEntry>, AkiError> {
        let needle = query.to_lowercase();
        Ok(self
            .read(None)?
            .into_iter()
            .filter(|e| {
                serde_json::to_string(e)
                    .map(|s| s.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .collect())
    }

    pub fn stats(&self) -> Result<JournalStats, AkiError> {
        let entries = self.read(None)?;
        let mut stats = JournalStats {
            total_entries: entries.len(),
            first: entries.first().map(|e| e.timestamp.clone()),
            last: entries.last().map(|e| e.timestamp.clone()),
            ..JournalStats::default()
        };
        for e in &entries {
            *stats.by_type.entry(e.kind().to_string()).or_default() += 1;
            if let Some(p) = e.persona() {
                *stats.by_persona.entry(p.to_string()).or_default() += 1;
            }
        }
        Ok(stats)
    }

    /// Write all readable entries, decoded, as a pretty JSON array.
    pub fn export(&self, dest: &Path) -> Result<usize, AkiError> {
        let entries = self.read(None)?;
        fs::write(dest, serde_json::to_string_pretty(&entries)?)?;
        tracing::info!(count = entries.len(), dest = %dest.display(), "journal exported");
        Ok(entries.len())
    }

    /// Truncate the journal. Refused unless `confirm` is set.
    pub fn clear(&self, confirm: bool) -> Result<(), AkiError> {
        if !confirm {
            return Err(AkiError::ValidationError(
                "refusing to clear the journal without confirmation (--yes)".to_string(),
            ));
        }
        let _guard = lock(&APPEND_LOCK);
        fs::write(&self.path, "")?;
        lock(&self.recent).clear();
        tracing::info!(path = %self.path.display(), "journal cleared");
        Ok(())
    }
}

impl LogSink for Journal {
    fn append(&self, entry: &LogEntry) -> Result<(), AkiError> {
        let line = self.encode(entry)?;
        {
            let mut recent = lock(&self.recent);
            if recent.len() == RECENT_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(entry.clone());
        }

        let _guard = lock(&APPEND_LOCK);
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(f, "{}", line)?;
        Ok(())
    }
}
