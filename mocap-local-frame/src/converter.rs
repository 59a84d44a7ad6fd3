/// Streaming marker record converter orchestrating decode, transform and encode per row.
use crate::config::MarkerIndexConfig;
use crate::decoder::FrameDecoder;
use crate::encoder::{blank_record, encode, header_fields};
use crate::error::{ConvertError, DecodeError};
use crate::transform::{Direction, FrameTransformer, Heading, TransformedFrame};
use constants::marker::MARKER_COUNT;
use csv::ByteRecord;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Handling of records with fewer fields than the direction requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ShortRecordPolicy {
    /// Drop the record and keep going.
    Skip,
    /// Emit a record of empty fields so output rows stay aligned with input rows.
    Blank,
    /// Abort the run.
    Fail,
}

/// Stream-level settings for one conversion run.
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Skip the first input line.
    pub has_header: bool,
    /// Emit a column header before the first output record.
    pub write_header: bool,
    pub short_records: ShortRecordPolicy,
    /// Records transformed together; above one, batches run in parallel.
    pub batch_size: usize,
    pub show_progress: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            write_header: false,
            short_records: ShortRecordPolicy::Skip,
            batch_size: 1,
            show_progress: false,
        }
    }
}

/// Converts a stream of marker records between world and pelvis-local frames.
/// Each record is independent; output order always follows input order.
pub struct MarkerStreamConverter {
    direction: Direction,
    indices: MarkerIndexConfig,
    decoder: FrameDecoder,
    transformer: FrameTransformer,
    options: StreamOptions,
}

impl MarkerStreamConverter {
    pub fn new(direction: Direction, indices: MarkerIndexConfig, options: StreamOptions) -> Self {
        Self {
            direction,
            indices,
            decoder: FrameDecoder::new(direction),
            transformer: FrameTransformer::new(indices),
            options,
        }
    }

    /// Convert every record of `input` and write the results to `output`.
    pub fn convert<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<RunSummary, ConvertError> {
        info!(
            direction = ?self.direction,
            left_pelvis = self.indices.left_pelvis,
            right_pelvis = self.indices.right_pelvis,
            sacral = self.indices.sacral,
            "Converting marker records"
        );

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.options.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(output);

        if self.options.write_header {
            writer.write_record(header_fields(self.direction))?;
        }

        let pb = self.progress_bar();
        let batch_size = self.options.batch_size.max(1);
        let mut summary = RunSummary::new(self.direction, self.indices);
        let mut batch = Vec::new();

        for record in reader.byte_records() {
            batch.push(record?);
            if batch.len() >= batch_size {
                self.flush_batch(&mut batch, &mut writer, &mut summary)?;
                pb.set_position(summary.rows_read);
            }
        }
        if !batch.is_empty() {
            self.flush_batch(&mut batch, &mut writer, &mut summary)?;
            pb.set_position(summary.rows_read);
        }

        writer.flush()?;
        pb.finish_with_message("Records converted");
        summary.log();
        Ok(summary)
    }

    /// Transform a batch, write the results in input order and clear the batch.
    fn flush_batch<W: Write>(
        &self,
        batch: &mut Vec<ByteRecord>,
        writer: &mut csv::Writer<W>,
        summary: &mut RunSummary,
    ) -> Result<(), ConvertError> {
        let outcomes: Vec<Result<TransformedFrame, DecodeError>> = if batch.len() == 1 {
            batch.iter().map(|record| self.convert_record(record)).collect()
        } else {
            batch
                .par_iter()
                .map(|record| self.convert_record(record))
                .collect()
        };

        for (record, outcome) in batch.iter().zip(outcomes) {
            let line = record.position().map_or(0, |p| p.line());
            summary.rows_read += 1;

            match outcome {
                Ok(frame) => {
                    summary.record_frame(line, &frame);
                    writer.write_record(encode(&frame))?;
                    summary.rows_written += 1;
                }
                Err(source) => match self.options.short_records {
                    ShortRecordPolicy::Fail => {
                        return Err(ConvertError::ShortRecord { line, source });
                    }
                    ShortRecordPolicy::Skip => {
                        warn!(line, "Skipping record: {source}");
                        summary.rows_skipped += 1;
                    }
                    ShortRecordPolicy::Blank => {
                        warn!(line, "Blanking record: {source}");
                        writer.write_record(blank_record(self.direction))?;
                        summary.rows_blanked += 1;
                        summary.rows_written += 1;
                    }
                },
            }
        }

        writer.flush()?;
        batch.clear();
        Ok(())
    }

    fn convert_record(&self, record: &ByteRecord) -> Result<TransformedFrame, DecodeError> {
        let frame = self.decoder.decode(record.iter())?;
        Ok(self.transformer.transform(&frame))
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} records ({per_sec}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Converting records");
        pb
    }
}

/// Per-run statistics. Never influences the converted output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub direction: Direction,
    pub indices: MarkerIndexConfig,
    pub rows_read: u64,
    pub rows_written: u64,
    pub rows_skipped: u64,
    pub rows_blanked: u64,
    /// Rows whose sacral landmark sat over the pelvis center.
    pub heading_degenerate: u64,
    /// Rows without a horizontal sacral position.
    pub heading_sacral_missing: u64,
    pub pelvis_missing: u64,
    /// Rows in which no marker could be converted.
    pub rows_without_markers: u64,
    pub missing_markers: u64,
}

impl RunSummary {
    fn new(direction: Direction, indices: MarkerIndexConfig) -> Self {
        Self {
            direction,
            indices,
            rows_read: 0,
            rows_written: 0,
            rows_skipped: 0,
            rows_blanked: 0,
            heading_degenerate: 0,
            heading_sacral_missing: 0,
            pelvis_missing: 0,
            rows_without_markers: 0,
            missing_markers: 0,
        }
    }

    fn record_frame(&mut self, line: u64, frame: &TransformedFrame) {
        let markers = match frame {
            TransformedFrame::Local(local) => {
                match local.heading {
                    Heading::Resolved => {}
                    Heading::Degenerate => {
                        debug!(line, "Sacral landmark over pelvis center, using identity heading");
                        self.heading_degenerate += 1;
                    }
                    Heading::SacralMissing => {
                        debug!(line, "Sacral landmark missing, using identity heading");
                        self.heading_sacral_missing += 1;
                    }
                    Heading::PelvisMissing => {
                        debug!(line, "Pelvis landmark missing, row has no local frame");
                        self.pelvis_missing += 1;
                    }
                }
                &local.markers
            }
            TransformedFrame::World(markers) => markers,
        };

        let missing = markers.missing_count();
        if missing == MARKER_COUNT {
            self.rows_without_markers += 1;
        }
        self.missing_markers += missing as u64;
    }

    fn log(&self) {
        info!(
            rows_read = self.rows_read,
            rows_written = self.rows_written,
            rows_skipped = self.rows_skipped,
            rows_blanked = self.rows_blanked,
            missing_markers = self.missing_markers,
            "Conversion complete"
        );
        if self.heading_degenerate + self.heading_sacral_missing > 0 {
            warn!(
                degenerate = self.heading_degenerate,
                sacral_missing = self.heading_sacral_missing,
                "Rows converted with identity heading"
            );
        }
        if self.pelvis_missing > 0 {
            warn!(rows = self.pelvis_missing, "Rows without pelvis center");
        }
    }

    /// Save the summary as JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConvertError> {
        let mut file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut file, self)?;
        file.flush()?;
        info!("Saved {}", path.display());
        Ok(())
    }
}
