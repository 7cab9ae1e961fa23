//! In-memory table engine.

use std::fs;

use polars::prelude::DataFrame;
use tracing::debug;

use crate::engine::decode::RowDecoder;
use crate::engine::{ChunkIter, ReadConfig, TableEngine};
use crate::error::Result;

/// Engine that materializes the whole data file before decoding.
///
/// The default choice: fastest random access for files that fit in
/// memory. Chunked reads slice the materialized frame, so chunk and bulk
/// results are identical by construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryEngine;

impl TableEngine for MemoryEngine {
    fn read(&self, config: &ReadConfig) -> Result<DataFrame> {
        let decoder = RowDecoder::new(config)?;
        let contents = fs::read_to_string(&config.dat_path)?;
        let frame =
            decoder.decode_batch(contents.lines().enumerate().map(|(i, line)| (i + 1, line)))?;
        debug!(
            "read {} rows x {} columns from {}",
            frame.height(),
            frame.width(),
            config.dat_path.display()
        );
        Ok(frame)
    }

    fn read_chunked(&self, config: &ReadConfig, chunk_size: usize) -> Result<ChunkIter> {
        let chunk_size = chunk_size.max(1);
        let frame = self.read(config)?;
        let total = frame.height();
        let chunks = (0..total)
            .step_by(chunk_size)
            .map(move |offset| Ok(frame.slice(offset as i64, chunk_size)));
        Ok(Box::new(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::engine::{ColumnReadSpec, DecodeMethod};
    use crate::format::FieldKind;

    fn write_dat(rows: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..rows {
            writeln!(file, "{} {}.5", i, i).unwrap();
        }
        file
    }

    fn config(file: &NamedTempFile) -> ReadConfig {
        ReadConfig {
            dat_path: file.path().to_path_buf(),
            method: DecodeMethod::Whitespace,
            columns: vec![
                ColumnReadSpec {
                    name: "N".to_string(),
                    width: Some(6),
                    kind: Some(FieldKind::Integer),
                },
                ColumnReadSpec {
                    name: "V".to_string(),
                    width: Some(8),
                    kind: Some(FieldKind::Real),
                },
            ],
            usecols: None,
            null_values: HashMap::new(),
        }
    }

    #[test]
    fn test_bulk_read() {
        let file = write_dat(5);
        let frame = MemoryEngine.read(&config(&file)).unwrap();
        assert_eq!(frame.height(), 5);
        assert_eq!(frame.width(), 2);
    }

    #[test]
    fn test_chunk_lengths() {
        let file = write_dat(23);
        let chunks: Vec<DataFrame> = MemoryEngine
            .read_chunked(&config(&file), 10)
            .unwrap()
            .map(|c| c.unwrap())
            .collect();
        let lengths: Vec<usize> = chunks.iter().map(|c| c.height()).collect();
        assert_eq!(lengths, vec![10, 10, 3]);
    }

    #[test]
    fn test_chunks_concatenate_to_bulk() {
        let file = write_dat(23);
        let cfg = config(&file);
        let bulk = MemoryEngine.read(&cfg).unwrap();

        let mut chunks = MemoryEngine.read_chunked(&cfg, 10).unwrap();
        let mut rebuilt = chunks.next().unwrap().unwrap();
        for chunk in chunks {
            rebuilt.vstack_mut(&chunk.unwrap()).unwrap();
        }
        assert!(bulk.equals_missing(&rebuilt));
    }

    #[test]
    fn test_chunked_read_is_restartable() {
        let file = write_dat(8);
        let cfg = config(&file);
        let first: usize = MemoryEngine
            .read_chunked(&cfg, 3)
            .unwrap()
            .map(|c| c.unwrap().height())
            .sum();
        let second: usize = MemoryEngine
            .read_chunked(&cfg, 3)
            .unwrap()
            .map(|c| c.unwrap().height())
            .sum();
        assert_eq!(first, 8);
        assert_eq!(second, 8);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let file = write_dat(20);
        let lengths: Vec<usize> = MemoryEngine
            .read_chunked(&config(&file), 10)
            .unwrap()
            .map(|c| c.unwrap().height())
            .collect();
        assert_eq!(lengths, vec![10, 10]);
    }
}
