mod canvas;
mod components;
mod config;
mod error;
mod iou_matching;
mod mask;
pub mod measurement;
mod patience;
mod pipeline;
mod roi;
mod target;
mod tracker;

pub use canvas::{Canvas, LABEL_INTENSITY};
pub use components::extract_components;
pub use config::TrackerConfig;
pub use error::TrackError;
pub use imageproc::region_labelling::Connectivity;
pub use iou_matching::{best_candidate, intersection_over_union, CandidateMatch};
pub use mask::Mask;
pub use patience::{Acceptance, PatiencePolicy, PatienceTier};
pub use pipeline::{FrameSink, FrameSource, Pipeline, RunSummary};
pub use roi::Roi;
pub use target::Target;
pub use tracker::{FrameReport, Tracker};
