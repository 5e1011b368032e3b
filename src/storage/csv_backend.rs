use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use crate::errors::{EarningsError, Result};

use super::{ordered_cells, Collection, Row, RowStore};

const FILE_EXTENSION: &str = "csv";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed row store keeping one CSV file per collection.
#[derive(Debug, Clone)]
pub struct CsvRowStore {
    root: PathBuf,
}

impl CsvRowStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| {
            EarningsError::Config(format!(
                "cannot create data directory `{}`: {err}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root
            .join(format!("{}.{}", collection.name(), FILE_EXTENSION))
    }

    fn check_header(&self, collection: Collection, path: &Path) -> Result<()> {
        let mut reader = ReaderBuilder::new()
            .from_path(path)
            .map_err(|err| EarningsError::unavailable(collection, err))?;
        let headers = reader
            .headers()
            .map_err(|err| EarningsError::unavailable(collection, err))?;
        ensure_header(collection, headers)
    }
}

impl RowStore for CsvRowStore {
    fn read_all(&self, collection: Collection) -> Result<Vec<Row>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = ReaderBuilder::new()
            .from_path(&path)
            .map_err(|err| EarningsError::unavailable(collection, err))?;
        let headers = reader
            .headers()
            .map_err(|err| EarningsError::unavailable(collection, err))?
            .clone();
        ensure_header(collection, &headers)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| EarningsError::malformed(collection, err.to_string()))?;
            if record.len() != headers.len() {
                return Err(EarningsError::malformed(
                    collection,
                    format!("expected {} cells, found {}", headers.len(), record.len()),
                ));
            }
            let row: Row = headers
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.to_string(), cell.to_string()))
                .collect();
            rows.push(row);
        }
        debug!(collection = %collection, rows = rows.len(), "read csv collection");
        Ok(rows)
    }

    fn write_all(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        let cells = rows
            .iter()
            .map(|row| ordered_cells(collection, row))
            .collect::<Result<Vec<_>>>()?;

        let path = self.collection_path(collection);
        let tmp = tmp_path(&path);
        {
            let mut writer = WriterBuilder::new()
                .from_path(&tmp)
                .map_err(|err| EarningsError::unavailable(collection, err))?;
            writer
                .write_record(collection.columns())
                .map_err(|err| EarningsError::unavailable(collection, err))?;
            for record in &cells {
                writer
                    .write_record(record)
                    .map_err(|err| EarningsError::unavailable(collection, err))?;
            }
            writer
                .flush()
                .map_err(|err| EarningsError::unavailable(collection, err))?;
        }
        fs::rename(&tmp, &path).map_err(|err| EarningsError::unavailable(collection, err))?;
        debug!(collection = %collection, rows = rows.len(), "rewrote csv collection");
        Ok(())
    }

    fn append_rows(&self, collection: Collection, rows: &[Row]) -> Result<()> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return self.write_all(collection, rows);
        }
        let cells = rows
            .iter()
            .map(|row| ordered_cells(collection, row))
            .collect::<Result<Vec<_>>>()?;
        self.check_header(collection, &path)?;

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|err| EarningsError::unavailable(collection, err))?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        for record in &cells {
            writer
                .write_record(record)
                .map_err(|err| EarningsError::unavailable(collection, err))?;
        }
        writer
            .flush()
            .map_err(|err| EarningsError::unavailable(collection, err))?;
        debug!(collection = %collection, rows = rows.len(), "appended csv rows");
        Ok(())
    }
}

fn ensure_header(collection: Collection, headers: &StringRecord) -> Result<()> {
    let expected = collection.columns();
    let matches = headers.len() == expected.len()
        && headers
            .iter()
            .zip(expected.iter())
            .all(|(found, wanted)| found == *wanted);
    if matches {
        Ok(())
    } else {
        Err(EarningsError::malformed(
            collection,
            format!(
                "header `{}` does not match `{}`",
                headers.iter().collect::<Vec<_>>().join(","),
                expected.join(",")
            ),
        ))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
