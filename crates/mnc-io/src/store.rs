//! Plain-text sketch reader/writer.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error as ThisError;
use tracing::info;

use mnc_core::sketch::Sketch;

/// Separator between the row-count and column-count sections.
const SPLITTER: &str = "&&";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("sketch storage I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed sketch file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

fn malformed(path: &Path, reason: impl Into<String>) -> Error {
    Error::Malformed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Write `sketch` to a single file, replacing any existing one.
pub fn store_sketch(path: impl AsRef<Path>, sketch: &Sketch) -> Result<()> {
    let path = path.as_ref();
    let start = Instant::now();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut w = BufWriter::new(File::create(path)?);
    for c in sketch.row_counts() {
        writeln!(w, "{c}")?;
    }
    writeln!(w, "{SPLITTER}")?;
    for c in sketch.col_counts() {
        writeln!(w, "{c}")?;
    }
    w.flush()?;

    info!(path = %path.display(), elapsed_ms = start.elapsed().as_millis() as u64, "stored sketch");
    Ok(())
}

/// Read a sketch for a `rows` x `cols` matrix from `path`: either a single
/// file, or a directory of `part*` shards merged in filename sort order.
pub fn load_sketch(path: impl AsRef<Path>, rows: u64, cols: u64) -> Result<Sketch> {
    let path = path.as_ref();
    let start = Instant::now();

    let mut state = LoadState::new(rows as usize, cols as usize);
    if path.is_dir() {
        let mut parts: Vec<PathBuf> = fs::read_dir(path)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("part"))
            })
            .collect();
        parts.sort();
        if parts.is_empty() {
            return Err(malformed(path, "directory contains no part files"));
        }
        for part in parts {
            state.read_file(&part)?;
        }
    } else {
        state.read_file(path)?;
    }
    let sketch = state.finish(path)?;

    info!(path = %path.display(), elapsed_ms = start.elapsed().as_millis() as u64, "loaded sketch");
    Ok(sketch)
}

/// Line-by-line accumulator. The sentinel flips from the row section to the
/// column section exactly once, even across shard boundaries.
struct LoadState {
    row_counts: Vec<u64>,
    col_counts: Vec<u64>,
    rows: usize,
    cols: usize,
    in_rows: bool,
}

impl LoadState {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            row_counts: Vec::with_capacity(rows),
            col_counts: Vec::with_capacity(cols),
            rows,
            cols,
            in_rows: true,
        }
    }

    fn read_file(&mut self, path: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if line == SPLITTER {
                if !self.in_rows {
                    return Err(malformed(path, "duplicate sentinel line"));
                }
                self.in_rows = false;
                continue;
            }
            let value: u64 = line
                .trim()
                .parse()
                .map_err(|_| malformed(path, format!("invalid count line {line:?}")))?;
            let (section, cap) = if self.in_rows {
                (&mut self.row_counts, self.rows)
            } else {
                (&mut self.col_counts, self.cols)
            };
            if section.len() >= cap {
                return Err(malformed(path, "more count lines than matrix dimensions"));
            }
            section.push(value);
        }
        Ok(())
    }

    fn finish(self, path: &Path) -> Result<Sketch> {
        if self.in_rows {
            return Err(malformed(path, "missing sentinel line"));
        }
        if self.row_counts.len() != self.rows || self.col_counts.len() != self.cols {
            return Err(malformed(
                path,
                format!(
                    "expected {}+{} counts, found {}+{}",
                    self.rows,
                    self.cols,
                    self.row_counts.len(),
                    self.col_counts.len()
                ),
            ));
        }
        Ok(Sketch::from_counts(self.row_counts, self.col_counts))
    }
}
