//! Source loading and record file I/O.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{PipelineError, VerifyError};
use crate::models::Record;

/// Read the whole source document as UTF-8.
pub fn read_source(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|source| PipelineError::InputError {
        path: path.to_path_buf(),
        source,
    })
}

/// Write records as indented JSON, replacing any existing file.
/// Non-ASCII text is written as-is.
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), PipelineError> {
    let output_error = |source: std::io::Error| PipelineError::OutputError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(output_error)?;
    }

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|source| {
        PipelineError::JsonError {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(output_error)?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<Record>, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::InputError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| PipelineError::JsonError {
        path: path.to_path_buf(),
        source,
    })
}

/// Check that every record has an id and content, ids are unique, and all
/// embeddings share one dimension. Returns that dimension, if any records exist.
pub fn verify_records(records: &[Record]) -> Result<Option<usize>, VerifyError> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut dimension = None;

    for (index, record) in records.iter().enumerate() {
        if record.id.trim().is_empty() {
            return Err(VerifyError::EmptyId { index });
        }
        if !seen.insert(record.id.as_str()) {
            return Err(VerifyError::DuplicateId {
                index,
                id: record.id.clone(),
            });
        }
        if record.content.trim().is_empty() {
            return Err(VerifyError::EmptyContent { index });
        }
        if record.embedding.is_empty() {
            return Err(VerifyError::EmptyEmbedding { index });
        }

        let actual = record.embedding.len();
        match dimension {
            None => dimension = Some(actual),
            Some(expected) if expected != actual => {
                return Err(VerifyError::DimensionMismatch {
                    index,
                    expected,
                    actual,
                });
            }
            Some(_) => {}
        }
    }

    Ok(dimension)
}
