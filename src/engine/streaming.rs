//! Streaming table engine.
//!
//! Pulls the data file through a buffered reader in bounded batches, so
//! arbitrarily large files never have to fit in memory. The trade-off is
//! sequential access and per-batch decode cost.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use polars::prelude::DataFrame;
use tracing::debug;

use crate::engine::decode::RowDecoder;
use crate::engine::{ChunkIter, ReadConfig, TableEngine};
use crate::error::Result;

/// Batch size used when a bulk read goes through the streaming path.
const BULK_BATCH_ROWS: usize = 5000;

/// Engine that streams the data file from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingEngine;

impl TableEngine for StreamingEngine {
    fn read(&self, config: &ReadConfig) -> Result<DataFrame> {
        let mut chunks = self.read_chunked(config, BULK_BATCH_ROWS)?;
        let Some(first) = chunks.next() else {
            // empty file: decode nothing for an empty, correctly-shaped
            // frame
            let decoder = RowDecoder::new(config)?;
            return decoder.decode_batch(std::iter::empty::<(usize, &str)>());
        };
        let mut frame = first?;
        for chunk in chunks {
            frame.vstack_mut(&chunk?)?;
        }
        debug!(
            "streamed {} rows from {}",
            frame.height(),
            config.dat_path.display()
        );
        Ok(frame)
    }

    fn read_chunked(&self, config: &ReadConfig, chunk_size: usize) -> Result<ChunkIter> {
        let decoder = RowDecoder::new(config)?;
        let file = File::open(&config.dat_path)?;
        Ok(Box::new(ChunkReader {
            lines: BufReader::new(file).lines(),
            decoder,
            chunk_size: chunk_size.max(1),
            row: 0,
            done: false,
        }))
    }
}

/// Lazily decodes `chunk_size` lines per pull.
struct ChunkReader {
    lines: Lines<BufReader<File>>,
    decoder: RowDecoder,
    chunk_size: usize,
    row: usize,
    done: bool,
}

impl Iterator for ChunkReader {
    type Item = Result<DataFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch: Vec<String> = Vec::with_capacity(self.chunk_size);
        while batch.len() < self.chunk_size {
            match self.lines.next() {
                Some(Ok(line)) => batch.push(line),
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        if batch.is_empty() {
            return None;
        }

        let first_row = self.row + 1;
        self.row += batch.len();
        Some(
            self.decoder.decode_batch(
                batch
                    .iter()
                    .enumerate()
                    .map(|(i, line)| (first_row + i, line.as_str())),
            ),
        )
    }
}
