//! CSV sink.

use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::core::records::{ContentRecord, ParticipantRecord};
use crate::error::Result;

use super::{Artifact, OutputLayout};

/// A row type bound to one artifact.
pub trait CsvRecord {
    /// The artifact this record is written to.
    const ARTIFACT: Artifact;

    /// Fields in header order.
    fn to_row(&self) -> Vec<String>;
}

impl CsvRecord for ParticipantRecord {
    const ARTIFACT: Artifact = Artifact::Members;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.username.clone(),
            self.name.clone(),
            self.profile_link.clone(),
            self.phone.clone(),
        ]
    }
}

impl CsvRecord for ContentRecord {
    const ARTIFACT: Artifact = Artifact::Transcript;

    fn to_row(&self) -> Vec<String> {
        vec![
            self.message_id.to_string(),
            self.local_date(),
            self.sender.clone(),
            self.text.clone(),
        ]
    }
}

/// A canonical invite link row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteLink(pub String);

impl InviteLink {
    pub fn new(link: impl Into<String>) -> Self {
        Self(link.into())
    }
}

impl CsvRecord for InviteLink {
    const ARTIFACT: Artifact = Artifact::Links;

    fn to_row(&self) -> Vec<String> {
        vec![self.0.clone()]
    }
}

/// What a closed sink produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSummary {
    pub artifact: Artifact,
    pub path: PathBuf,
    /// Data rows written, header excluded
    pub rows: usize,
}

/// Append-only CSV writer for one artifact.
///
/// # Format
/// - Delimiter: `,`
/// - Header: [`Artifact::header`], written on creation
/// - Encoding: UTF-8
///
/// Every row is flushed to the file before `write` returns, so an aborted
/// run leaves all rows written so far on disk. Dropping the sink closes the
/// file; [`finish`](Self::finish) does the same and reports what was written.
#[derive(Debug)]
pub struct CsvSink<R: CsvRecord> {
    writer: csv::Writer<File>,
    path: PathBuf,
    rows: usize,
    _record: PhantomData<fn(&R)>,
}

impl<R: CsvRecord> CsvSink<R> {
    /// Creates the artifact file for `name` at time `at` under `layout`.
    pub fn create(layout: &OutputLayout, name: &str, at: DateTime<Local>) -> Result<Self> {
        layout.ensure_dir(R::ARTIFACT)?;
        Self::create_at(layout.path_for(R::ARTIFACT, name, at))
    }

    /// Creates (or truncates) a file at an explicit path and writes the header.
    pub fn create_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        let mut writer = csv::WriterBuilder::new().from_writer(file);
        writer.write_record(R::ARTIFACT.header())?;
        writer.flush()?;

        debug!(path = %path.display(), artifact = %R::ARTIFACT, "sink opened");

        Ok(Self {
            writer,
            path,
            rows: 0,
            _record: PhantomData,
        })
    }

    /// Appends one row and flushes it.
    pub fn write(&mut self, record: &R) -> Result<()> {
        self.writer.write_record(record.to_row())?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flushes and closes the file.
    pub fn finish(mut self) -> Result<SinkSummary> {
        self.writer.flush()?;
        Ok(SinkSummary {
            artifact: R::ARTIFACT,
            path: self.path,
            rows: self.rows,
        })
    }
}
