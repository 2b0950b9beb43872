//! Newline-delimited JSON reader.
//!
//! FooDB ships its tables as one JSON object per line. The reader yields one
//! [`NdjsonLine`] per non-blank line so callers can log and skip a malformed
//! record without giving up on the rest of the file.

use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

use crate::errors::Error;

/// One decoded (or failed) line.
#[derive(Debug)]
pub struct NdjsonLine<T> {
    /// One-based line number in the source.
    pub line: usize,
    /// The decoded record, or why it could not be decoded.
    pub record: Result<T, Error>,
}

/// Iterator over the records of an NDJSON source.
pub struct NdjsonReader<R, T> {
    origin: PathBuf,
    lines: Lines<R>,
    line: usize,
    _record: PhantomData<fn() -> T>,
}

/// Opens an NDJSON file for streaming.
pub fn open<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<NdjsonReader<BufReader<File>, T>, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(NdjsonReader::from_reader(path, BufReader::new(file)))
}

impl<R: BufRead, T: DeserializeOwned> NdjsonReader<R, T> {
    /// Reads from any buffered reader; `origin` only labels error messages.
    pub fn from_reader(origin: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            origin: origin.into(),
            lines: reader.lines(),
            line: 0,
            _record: PhantomData,
        }
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for NdjsonReader<R, T> {
    type Item = NdjsonLine<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.lines.next()?;
            self.line += 1;
            let record = match raw {
                Err(source) => Err(Error::Io {
                    path: self.origin.clone(),
                    source,
                }),
                Ok(text) if text.trim().is_empty() => continue,
                Ok(text) => serde_json::from_str(&text).map_err(|source| Error::MalformedLine {
                    path: self.origin.clone(),
                    line: self.line,
                    source,
                }),
            };
            return Some(NdjsonLine {
                line: self.line,
                record,
            });
        }
    }
}
