use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("seed frame {index} contains no connected components")]
    EmptySeedFrame { index: usize },
    #[error("frame {index} could not be read: {reason}")]
    UnreadableFrame { index: usize, reason: String },
    #[error("frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        index: usize,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("target {id} does not fit an 8-bit code with gray value {gray_value}")]
    IntensityOverflow { id: u32, gray_value: u8 },
    #[error("frame range [{start}, {end}) is invalid for {available} frames")]
    InvalidFrameRange {
        start: usize,
        end: usize,
        available: usize,
    },
    #[error("seed frame {seed} is outside the {available} available frames")]
    SeedOutOfRange { seed: usize, available: usize },
    #[error("invalid patience tiers: {reason}")]
    InvalidTiers { reason: String },
}
