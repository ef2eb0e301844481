use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::app::{NotecrawlError, Result};
use crate::domain::PostRecord;
use crate::store::Store;

/// Line-delimited JSON file, one record per line
pub struct JsonlStore {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlStore {
    /// Create (or truncate) the file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, false)
    }

    /// Open the file at `path` for appending, creating it if needed
    pub fn append_to<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, true)
    }

    fn open_with<P: AsRef<Path>>(path: P, append: bool) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl Store for JsonlStore {
    fn append(&self, record: &PostRecord) -> Result<()> {
        let line = record.to_json_line()?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| NotecrawlError::Other(format!("Output writer poisoned: {}", e)))?;

        writeln!(writer, "{}", line)?;
        // Flush per record so an interrupted crawl keeps what it scraped
        writer.flush()?;
        Ok(())
    }
}
