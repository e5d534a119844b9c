// Delimited-text history. The whole file is the history; derived difference
// columns are rewritten in full after each append.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::delta::{recompute_deltas, History};
use crate::error::Result;
use crate::row::{FieldValue, FlattenedRow};
use crate::traits::HistorySink;

#[derive(Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the full history. `None` when the file does not exist.
    pub fn read_history(&self) -> Result<Option<History>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut reader = ::csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();

        for record in reader.records() {
            let record = record?;
            let row: FlattenedRow = columns
                .iter()
                .enumerate()
                .map(|(i, col)| (col.as_str(), FieldValue::from_cell(record.get(i).unwrap_or(""))))
                .collect();
            rows.push(row);
        }

        Ok(Some(History { columns, rows }))
    }

    /// Replace the file with `history`, via a temp file in the same directory.
    pub fn write_history(&self, history: &History) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = ::csv::Writer::from_writer(tmp.as_file_mut());
            writer.write_record(&history.columns)?;
            for row in &history.rows {
                writer.write_record(row.cells_for(&history.columns))?;
            }
            writer.flush()?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), rows = history.rows.len(), "Rewrote CSV history");
        Ok(())
    }

    /// Append one record aligned to an existing header.
    fn append_aligned(&self, columns: &[String], row: &FlattenedRow) -> Result<()> {
        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;

        if !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(row.cells_for(columns))?;
        writer.flush()?;
        Ok(())
    }
}

fn ends_with_newline(file: &mut std::fs::File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl CsvSink {
    fn append_blocking(&self, row: &FlattenedRow) -> Result<()> {
        match self.read_history()? {
            Some(mut history) if !history.columns.is_empty() => {
                let added = history.widen_to(row);
                if added == 0 {
                    self.append_aligned(&history.columns, row)?;
                } else {
                    info!(
                        path = %self.path.display(),
                        added,
                        "Feed introduced new fields, widening CSV header"
                    );
                    history.rows.push(row.clone());
                    self.write_history(&history)?;
                }
            }
            _ => {
                let history = History {
                    columns: row.names().map(str::to_string).collect(),
                    rows: vec![row.clone()],
                };
                self.write_history(&history)?;
                info!(path = %self.path.display(), "Created CSV history");
            }
        }
        Ok(())
    }

    fn refresh_blocking(&self) -> Result<()> {
        let Some(mut history) = self.read_history()? else {
            return Ok(());
        };
        recompute_deltas(&mut history);
        self.write_history(&history)
    }

    /// Run file I/O off the async executor.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CsvSink) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sink = self.clone();
        tokio::task::spawn_blocking(move || f(&sink)).await?
    }
}

#[async_trait]
impl HistorySink for CsvSink {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    async fn last_row(&self) -> Result<Option<FlattenedRow>> {
        self.blocking(|sink| {
            Ok(sink
                .read_history()?
                .and_then(|history| history.rows.last().cloned()))
        })
        .await
    }

    async fn append(&self, row: &FlattenedRow) -> Result<()> {
        let row = row.clone();
        self.blocking(move |sink| sink.append_blocking(&row)).await
    }

    async fn refresh_derived(&self) -> Result<()> {
        self.blocking(|sink| sink.refresh_blocking()).await
    }
}
