//! Console output for audit runs.

use std::io::{self, Write};

use k8s_openapi::api::core::v1::Event;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;
use crate::event::{display_time, EventRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full record per event
    #[default]
    Text,
    /// Type, reason and last timestamp only
    Brief,
    /// One JSON object per event
    Json,
}

const DELIMITER: &str = "------------------------";

pub struct Reporter<W> {
    out: W,
    format: OutputFormat,
}

impl Reporter<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn decorated(&self) -> bool {
        self.format != OutputFormat::Json
    }

    pub fn general_banner(&mut self) -> io::Result<()> {
        if !self.decorated() {
            return Ok(());
        }
        writeln!(self.out, "👀 Looking for general troublesome events in the cluster..")
    }

    pub fn node_banner(&mut self, lookback_minutes: u32) -> io::Result<()> {
        if !self.decorated() {
            return Ok(());
        }
        writeln!(
            self.out,
            "👀 Looking for Node troublesome events (now()-{lookback_minutes}m) in the cluster.."
        )
    }

    pub fn troubled(&mut self, header: &str, events: &[Event]) -> io::Result<()> {
        if self.decorated() {
            writeln!(self.out, "🔥 Detected troublesome {header}:")?;
        }
        for ev in events {
            self.event(&EventRecord::from(ev))?;
        }
        Ok(())
    }

    fn event(&mut self, rec: &EventRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                self.headline(rec)?;
                writeln!(self.out, "Message: \t {}", rec.message)?;
                writeln!(self.out, "Namespace: \t {}", rec.namespace)?;
                writeln!(self.out, "Event Time: \t {}", display_time(rec.event_time))?;
                writeln!(self.out, "{DELIMITER}")
            }
            OutputFormat::Brief => self.headline(rec),
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, rec)?;
                writeln!(self.out)
            }
        }
    }

    fn headline(&mut self, rec: &EventRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "🗒️  {} \t {} \t {}",
            rec.type_,
            rec.reason,
            display_time(rec.last_timestamp)
        )
    }

    pub fn failure(&mut self, err: &AuditError) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({ "error": err.to_string() });
                serde_json::to_writer(&mut self.out, &value)?;
                writeln!(self.out)
            }
            _ => writeln!(self.out, "{err}"),
        }
    }

    pub fn healthy(&mut self) -> io::Result<()> {
        if !self.decorated() {
            return Ok(());
        }
        writeln!(self.out, "No troublesome events found.")
    }

    pub fn background_notice(&mut self, pid: u32) -> io::Result<()> {
        if !self.decorated() {
            return Ok(());
        }
        writeln!(self.out, "Program is running in the background (pid {pid})...")?;
        writeln!(self.out, "Use 'kill {pid}' to stop the program.")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
