//! Compliance Ledger - append-only JSONL audit trail
//!
//! File mode writes one JSON event per line and flushes after each append.
//! In-memory mode keeps the events in a buffer so short-lived clients still
//! expose their trail.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::ComplianceResult;
use crate::event::ComplianceEvent;

enum Backend {
    File { path: PathBuf, file: File },
    Memory(Vec<ComplianceEvent>),
}

/// Append-only ledger of [`ComplianceEvent`]s
pub struct ComplianceLedger {
    backend: Backend,
}

impl ComplianceLedger {
    /// Open (or create) a ledger file, creating parent directories
    pub fn open(path: impl AsRef<Path>) -> ComplianceResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            backend: Backend::File { path, file },
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Vec::new()),
        }
    }

    pub fn append(&mut self, event: &ComplianceEvent) -> ComplianceResult<()> {
        match &mut self.backend {
            Backend::File { file, .. } => {
                let line = serde_json::to_string(event)?;
                writeln!(file, "{}", line)?;
                file.flush()?;
            }
            Backend::Memory(events) => events.push(event.clone()),
        }
        tracing::debug!(event_type = event.event_type(), event_id = event.id(), "Ledger append");
        Ok(())
    }

    pub fn read_all(&self) -> ComplianceResult<Vec<ComplianceEvent>> {
        self.read_from(0)
    }

    /// Events starting at line `start` (0-based), skipping blank lines
    pub fn read_from(&self, start: usize) -> ComplianceResult<Vec<ComplianceEvent>> {
        match &self.backend {
            Backend::Memory(events) => Ok(events.iter().skip(start).cloned().collect()),
            Backend::File { path, .. } => {
                let reader = BufReader::new(File::open(path)?);
                let mut events = Vec::new();
                for line in reader.lines().skip(start) {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    events.push(serde_json::from_str(&line)?);
                }
                Ok(events)
            }
        }
    }

    /// Current line count (for checkpointing with `read_from`)
    pub fn line_count(&self) -> ComplianceResult<usize> {
        match &self.backend {
            Backend::Memory(events) => Ok(events.len()),
            Backend::File { path, .. } => Ok(BufReader::new(File::open(path)?).lines().count()),
        }
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.backend {
            Backend::File { path, .. } => Some(path),
            Backend::Memory(_) => None,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        matches!(self.backend, Backend::Memory(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kyc::ClaimType;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample(i: usize) -> ComplianceEvent {
        ComplianceEvent::kyc_claim_stored(&format!("claim-{}", i), ClaimType::AgeOver18, Utc::now())
    }

    #[test]
    fn test_in_memory_ledger_keeps_events() {
        let mut ledger = ComplianceLedger::in_memory();
        ledger.append(&sample(1)).unwrap();
        ledger.append(&sample(2)).unwrap();

        assert!(ledger.is_in_memory());
        assert!(ledger.path().is_none());
        assert_eq!(ledger.read_all().unwrap().len(), 2);
        assert_eq!(ledger.line_count().unwrap(), 2);
    }

    #[test]
    fn test_file_ledger_write_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compliance.jsonl");

        let event1 = sample(1);
        let event2 = ComplianceEvent::attestation_revoked("att-1", Utc::now());

        {
            let mut ledger = ComplianceLedger::open(&path).unwrap();
            ledger.append(&event1).unwrap();
            ledger.append(&event2).unwrap();
        }

        let ledger = ComplianceLedger::open(&path).unwrap();
        let events = ledger.read_all().unwrap();
        assert_eq!(events, vec![event1, event2]);
    }

    #[test]
    fn test_read_from_checkpoint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("compliance.jsonl");

        let mut ledger = ComplianceLedger::open(&path).unwrap();
        for i in 0..5 {
            ledger.append(&sample(i)).unwrap();
        }

        assert_eq!(ledger.line_count().unwrap(), 5);
        let tail = ledger.read_from(3).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0], ledger.read_all().unwrap()[3]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("compliance.jsonl");

        let event = sample(1);
        let line = serde_json::to_string(&event).unwrap();
        std::fs::write(&path, format!("\n{}\n\n", line)).unwrap();

        let ledger = ComplianceLedger::open(&path).unwrap();
        assert_eq!(ledger.read_all().unwrap(), vec![event]);
    }
}
