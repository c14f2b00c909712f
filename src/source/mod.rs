//! Domain source.
//!
//! Domains come either from an Afnic open-data archive (a zip holding a single
//! `;`-separated CSV with a header row) or from a plain text list with one
//! domain per line. The source is validated when opened, before any query is
//! sent; reading happens later on a blocking thread that feeds a bounded
//! channel.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use zip::ZipArchive;

use crate::config::{CSV_DELIMITER, DOMAIN_COLUMN, DOMAIN_COUNTER_STEP, EXCLUDED_COLUMN};
use crate::error_handling::SourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Zip archive with one CSV file
    Archive,
    /// One domain per line
    List,
}

impl SourceFormat {
    fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zip") => SourceFormat::Archive,
            _ => SourceFormat::List,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DomainSource {
    path: PathBuf,
    format: SourceFormat,
}

impl DomainSource {
    /// Opens and validates the source at `path`.
    ///
    /// For archives this checks that exactly one file is present and that its
    /// CSV has a header row.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let format = SourceFormat::detect(path);
        match format {
            SourceFormat::Archive => {
                let mut archive = ZipArchive::new(File::open(path)?)?;
                ensure_single_entry(&archive)?;
                let mut reader = csv_reader(archive.by_index(0)?);
                if reader.headers()?.is_empty() {
                    return Err(SourceError::EmptyArchive);
                }
            }
            SourceFormat::List => {
                File::open(path)?;
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            format,
        })
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Calls `sink` with every fully-qualified domain, in file order.
    ///
    /// Reading stops early when `sink` returns `false`. Returns the number of
    /// domains handed to `sink`.
    pub fn for_each_domain<F>(&self, mut sink: F) -> Result<usize, SourceError>
    where
        F: FnMut(String) -> bool,
    {
        match self.format {
            SourceFormat::Archive => {
                let mut archive = ZipArchive::new(File::open(&self.path)?)?;
                ensure_single_entry(&archive)?;
                let entry = archive.by_index(0)?;
                read_csv(entry, &mut sink)
            }
            SourceFormat::List => read_list(File::open(&self.path)?, &mut sink),
        }
    }

    /// Collects every domain of the source.
    pub fn domains(&self) -> Result<Vec<String>, SourceError> {
        let mut domains = Vec::new();
        self.for_each_domain(|domain| {
            domains.push(domain);
            true
        })?;
        Ok(domains)
    }

    /// Streams the domains into `tx` from a blocking thread.
    ///
    /// `read` is incremented for each domain sent. The channel is closed when
    /// the task ends, whether the source was exhausted or every receiver went
    /// away.
    pub fn spawn_feed(
        self,
        tx: mpsc::Sender<String>,
        read: Arc<AtomicUsize>,
        verbose: bool,
    ) -> JoinHandle<Result<usize, SourceError>> {
        tokio::task::spawn_blocking(move || {
            let fed = self.for_each_domain(|domain| {
                if tx.blocking_send(domain).is_err() {
                    debug!("Domain feed receivers closed, stopping early");
                    return false;
                }
                let count = read.fetch_add(1, Ordering::SeqCst) + 1;
                if verbose && count % DOMAIN_COUNTER_STEP == 0 {
                    info!("{count} domains read");
                }
                true
            })?;
            debug!("Domain feed finished after {fed} domains");
            Ok(fed)
        })
    }
}

/// Appends the root label if `name` does not already end with one.
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

fn ensure_single_entry<R: Read + std::io::Seek>(archive: &ZipArchive<R>) -> Result<(), SourceError> {
    match archive.len() {
        1 => Ok(()),
        n => Err(SourceError::UnexpectedArchiveShape(n)),
    }
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(input)
}

fn read_csv<R: Read>(input: R, sink: &mut impl FnMut(String) -> bool) -> Result<usize, SourceError> {
    let mut reader = csv_reader(input);
    let mut fed = 0;
    for (line, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!("Skipping malformed CSV row {}: {e}", line + 2);
                continue;
            }
        };
        if row.len() <= EXCLUDED_COLUMN {
            debug!("Skipping CSV row {} with {} columns", line + 2, row.len());
            continue;
        }
        let excluded = row.get(EXCLUDED_COLUMN).unwrap_or_default();
        let domain = row.get(DOMAIN_COLUMN).unwrap_or_default().trim();
        if !excluded.is_empty() || domain.is_empty() {
            continue;
        }
        fed += 1;
        if !sink(fqdn(domain)) {
            break;
        }
    }
    Ok(fed)
}

fn read_list<R: Read>(input: R, sink: &mut impl FnMut(String) -> bool) -> Result<usize, SourceError> {
    let mut fed = 0;
    for line in BufReader::new(input).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        fed += 1;
        if !sink(fqdn(trimmed)) {
            break;
        }
    }
    Ok(fed)
}
