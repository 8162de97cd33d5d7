//! Append-only notification log writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use dragline_common::error::DraglineResult;
use dragline_gesture_model::notification::{NotificationLogHeader, RecordedNotification};

/// Writes notifications to a JSONL file in append-only mode.
pub struct NotificationWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl NotificationWriter {
    /// Create a new writer, writing the header as the first line.
    pub fn new(path: PathBuf, header: &NotificationLogHeader) -> DraglineResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);

        // Header goes on a comment line (prefixed with #)
        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")?;

        Ok(Self {
            writer,
            path,
            written: 0,
        })
    }

    /// Write a single notification as a JSONL line.
    pub fn write(&mut self, notification: &RecordedNotification) -> DraglineResult<()> {
        let json = serde_json::to_string(notification)?;
        writeln!(self.writer, "{json}")?;
        self.written += 1;

        if self.written % 256 == 0 {
            self.flush()?;
        }

        Ok(())
    }

    /// Write every notification in order.
    pub fn write_all(&mut self, notifications: &[RecordedNotification]) -> DraglineResult<()> {
        for notification in notifications {
            self.write(notification)?;
        }
        Ok(())
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> DraglineResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of notifications written.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the output file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for NotificationWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
