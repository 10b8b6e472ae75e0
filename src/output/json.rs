//! JSON snapshot files
//!
//! Two files are written: an object mapping product id to product record,
//! and an array of broken link paths.

use crate::config::OutputConfig;
use crate::output::traits::{OutputError, OutputResult, SnapshotWriter};
use crate::state::CrawlSnapshot;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes the product map and the broken link list as JSON files
#[derive(Debug, Clone)]
pub struct JsonSnapshotWriter {
    products_path: PathBuf,
    broken_links_path: PathBuf,
    pretty: bool,
}

impl JsonSnapshotWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            products_path: PathBuf::from(&config.products_path),
            broken_links_path: PathBuf::from(&config.broken_links_path),
            pretty: config.pretty,
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> OutputResult<()> {
        let io_err = |source| OutputError::Io {
            path: path.display().to_string(),
            source,
        };

        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }

        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

impl SnapshotWriter for JsonSnapshotWriter {
    fn write_snapshot(&self, snapshot: &CrawlSnapshot) -> OutputResult<()> {
        self.write_json(&self.products_path, &snapshot.products)?;
        self.write_json(&self.broken_links_path, &snapshot.broken_links)?;
        Ok(())
    }
}
