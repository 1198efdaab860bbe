// log.rs — Append-only JSONL graduation log.
//
// One JSON object per line, append-friendly, easy to parse with standard
// tools (jq, grep). Each event is linked to the previous one via
// `previous_hash`, so inserting, deleting, or modifying events breaks the
// chain and is detectable by `verify_chain`.
//
// Ordering: appends preserve insertion order globally, which also
// preserves per-agent order — the invariant the graduation engine relies
// on.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::AuditError;
use crate::event::GraduationEvent;
use crate::hasher;

/// Destination for graduation events.
///
/// The engine takes `&mut dyn AuditSink`, so tests can capture events in
/// memory and deployments can fan out to their own audit pipeline.
pub trait AuditSink: Send {
    /// Append an event. Implementations set `previous_hash` if they chain.
    fn append(&mut self, event: &mut GraduationEvent) -> Result<(), AuditError>;
}

/// An append-only graduation log backed by a JSONL file.
pub struct GraduationLog {
    writer: BufWriter<File>,
    path: PathBuf,
    /// Hash of the last event written — becomes `previous_hash` of the next.
    last_hash: Option<String>,
}

impl GraduationLog {
    /// Open (or create) a graduation log at the given path.
    ///
    /// If the file already exists, the last line is re-hashed so new
    /// events link correctly onto the existing chain.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();

        let last_hash = if path.exists() {
            Self::read_last_hash(&path)?
        } else {
            None
        };

        // Append mode — existing data is never overwritten.
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| AuditError::OpenFailed {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
            last_hash,
        })
    }

    /// Read all events from a log file, oldest first.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<GraduationEvent>, AuditError> {
        let file = File::open(path.as_ref()).map_err(|source| AuditError::OpenFailed {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }

        Ok(events)
    }

    /// All events for one agent, in insertion order.
    pub fn read_agent(
        path: impl AsRef<Path>,
        agent_id: &str,
    ) -> Result<Vec<GraduationEvent>, AuditError> {
        Ok(Self::read_all(path)?
            .into_iter()
            .filter(|event| event.agent_id == agent_id)
            .collect())
    }

    /// Verify the integrity of a log file's hash chain.
    ///
    /// Checks that each event's `previous_hash` matches the hash of the
    /// preceding raw JSON line. Returns `Ok(())` if intact.
    pub fn verify_chain(path: impl AsRef<Path>) -> Result<(), AuditError> {
        let file = File::open(path.as_ref()).map_err(|source| AuditError::OpenFailed {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut previous_hash: Option<String> = None;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let event: GraduationEvent = serde_json::from_str(&line)?;
            if event.previous_hash != previous_hash {
                return Err(AuditError::IntegrityViolation {
                    line: line_num + 1,
                    expected: previous_hash.unwrap_or_else(|| "None".to_string()),
                    actual: event.previous_hash.unwrap_or_else(|| "None".to_string()),
                });
            }

            // Hash the raw JSON line, not the re-serialized event —
            // re-serialization could change field order.
            previous_hash = Some(hasher::hash_str(&line));
        }

        Ok(())
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_last_hash(path: &Path) -> Result<Option<String>, AuditError> {
        let file = File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut last_line = None;
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                last_line = Some(line);
            }
        }
        Ok(last_line.map(|line| hasher::hash_str(&line)))
    }
}

impl AuditSink for GraduationLog {
    /// Append an event, linking it into the hash chain and flushing to
    /// disk before returning.
    fn append(&mut self, event: &mut GraduationEvent) -> Result<(), AuditError> {
        event.previous_hash = self.last_hash.clone();

        let json = serde_json::to_string(event)?;
        let next_hash = hasher::hash_str(&json);

        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;

        // Only advance the chain once the line is actually on disk.
        self.last_hash = Some(next_hash);
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Default)]
pub struct MemorySink {
    pub events: Vec<GraduationEvent>,
}

impl AuditSink for MemorySink {
    fn append(&mut self, event: &mut GraduationEvent) -> Result<(), AuditError> {
        self.events.push(event.clone());
        Ok(())
    }
}
