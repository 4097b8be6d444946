// ## 📂 File: `src/audit/sink.rs`

//! audit/sink.rs
//! Destinations for audit events.
//!
//! Sinks never fail the caller: a write error is reported through `tracing`
//! and the event is dropped. All sinks are `Send + Sync` and shared by `Arc`.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tracing::{error, info, warn};

use crate::audit::event::{AuditEvent, AuditStatus};

pub trait AuditSink: Send + Sync {
    fn log(&self, event: AuditEvent);
}

/// Emits each event as one JSON line on the `audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn log(&self, event: AuditEvent) {
        let line = event.to_json_line();
        match event.status {
            AuditStatus::Success => info!(target: "audit", "{}", line),
            AuditStatus::Failure => warn!(target: "audit", "{}", line),
        }
    }
}

/// Append-only JSON Lines file, flushed after every event.
#[derive(Debug)]
pub struct JsonLinesAuditSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesAuditSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { writer: Mutex::new(BufWriter::new(file)) })
    }

    fn writer(&self) -> MutexGuard<'_, BufWriter<File>> {
        // A panic mid-write leaves at worst a torn line; keep logging.
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn log(&self, event: AuditEvent) {
        let mut line = event.to_json_line();
        line.push('\n');
        let mut w = self.writer();
        if let Err(e) = w.write_all(line.as_bytes()).and_then(|_| w.flush()) {
            error!(error = %e, action = %event.action, "audit write failed");
        }
    }
}

/// Keeps events in memory; for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn log(&self, event: AuditEvent) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).push(event);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn log(&self, _event: AuditEvent) {}
}

/// Fan out to several sinks in order.
#[derive(Default)]
pub struct MultiAuditSink {
    sinks: Vec<std::sync::Arc<dyn AuditSink>>,
}

impl MultiAuditSink {
    pub fn new(sinks: Vec<std::sync::Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }
}

impl AuditSink for MultiAuditSink {
    fn log(&self, event: AuditEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.log(event.clone());
            }
            last.log(event);
        }
    }
}
