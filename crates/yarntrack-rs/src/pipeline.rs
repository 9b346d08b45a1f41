use crate::*;
use anyhow::Result;
use image::GrayImage;
use std::ops::Range;
use tracing::{info, warn};

/// An ordered, indexable sequence of equally sized frames.
pub trait FrameSource {
    /// Returns the number of frames available
    fn len(&self) -> usize;

    /// Returns true if no frames are available
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load frame `index` as 8-bit grayscale.
    fn load(&self, index: usize) -> Result<GrayImage>;
}

/// Receives the output canvas of every processed frame.
pub trait FrameSink {
    fn emit(&mut self, index: usize, canvas: &GrayImage, report: &FrameReport) -> Result<()>;
}

/// Outcome of a run over a frame range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of frames tracked and emitted.
    pub processed: usize,
    /// Frames that could not be read and were skipped.
    pub skipped: Vec<usize>,
}

/// Sequences a tracker over the half-open frame range `[start, end)` of a source.
#[derive(Debug)]
pub struct Pipeline<S> {
    source: S,
    range: Range<usize>,
    seed_index: usize,
}

impl<S: FrameSource> Pipeline<S> {
    /// Returns a new Pipeline
    ///
    /// # Parameters
    ///
    /// * `source`: The frames.
    /// * `range`: Frames to process, in order.
    /// * `seed_index`: Frame whose components become the targets. Defaults to `range.start`.
    pub fn new(source: S, range: Range<usize>, seed_index: Option<usize>) -> Result<Pipeline<S>> {
        let available = source.len();
        if range.start > range.end || range.end > available {
            return Err(TrackError::InvalidFrameRange {
                start: range.start,
                end: range.end,
                available,
            }
            .into());
        }
        let seed_index = seed_index.unwrap_or(range.start);
        if seed_index >= available {
            return Err(TrackError::SeedOutOfRange {
                seed: seed_index,
                available,
            }
            .into());
        }
        Ok(Pipeline {
            source,
            range,
            seed_index,
        })
    }

    /// Return the source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the frame range
    pub fn range(&self) -> &Range<usize> {
        &self.range
    }

    /// Return the seed frame index
    pub fn seed_index(&self) -> usize {
        self.seed_index
    }

    /// Seed a tracker from the seed frame. An unreadable seed frame is fatal.
    pub fn seed(&self, config: TrackerConfig) -> Result<Tracker> {
        let seed = self.source.load(self.seed_index).map_err(|error| {
            TrackError::UnreadableFrame {
                index: self.seed_index,
                reason: format!("{error:#}"),
            }
        })?;
        Tracker::new(config, self.seed_index, &seed)
    }

    /// Track every frame of the range in order and hand each canvas to `sink`.
    ///
    /// Logs a warning once when the config enables labels but the tracker has no font.
    ///
    /// A frame that cannot be loaded, or does not match the seed size, is logged and skipped:
    /// nothing is emitted for it and the tracker carries into the next frame untouched. A sink
    /// failure ends the run.
    pub fn run<K: FrameSink>(&self, tracker: &mut Tracker, sink: &mut K) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        if tracker.config().labeling_enabled() && !tracker.has_label_font() {
            warn!("labeling is enabled but no label font is set, ids will not be drawn");
        }

        for index in self.range.clone() {
            let tracked = self
                .source
                .load(index)
                .and_then(|frame| tracker.track(index, &frame));

            match tracked {
                Ok((canvas, report)) => {
                    sink.emit(index, &canvas, &report)?;
                    summary.processed += 1;
                }
                Err(error) => {
                    warn!(frame = index, "skipping frame: {error:#}");
                    summary.skipped.push(index);
                }
            }
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped.len(),
            "tracking finished"
        );
        Ok(summary)
    }
}
