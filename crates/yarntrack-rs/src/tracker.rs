use crate::*;
use anyhow::Result;
use image::GrayImage;
use indexmap::IndexMap;
use rayon::prelude::*;
use rusttype::Font;
use tracing::{debug, info};

/// What happened to the targets in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Index of the frame in the input sequence.
    pub frame_index: usize,
    /// Targets that re-acquired a candidate, in id order.
    pub accepted: Vec<(u32, Acceptance)>,
    /// Targets drawn from their stored mask, in id order.
    pub carried: Vec<u32>,
    /// For each escalation tier, the targets whose staleness is beyond it after this frame.
    pub escalated: [Vec<u32>; 3],
}

/// A match found in phase one, waiting to be committed.
#[derive(Debug)]
struct Proposal {
    id: u32,
    candidate: Mask,
    acceptance: Acceptance,
}

/// This is the multi-strand tracker.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma};
/// use yarntrack_rs::{Tracker, TrackerConfig};
///
/// // a single 20x10 strand cross-section
/// let frame = GrayImage::from_fn(128, 64, |x, y| {
///     if (40..60).contains(&x) && (20..30).contains(&y) {
///         Luma([255])
///     } else {
///         Luma([0])
///     }
/// });
///
/// let mut config = TrackerConfig::default();
/// config.with_labeling(false);
///
/// // seed the targets then track frame by frame
/// let mut tracker = Tracker::new(config, 0, &frame).unwrap();
/// let (canvas, report) = tracker.track(1, &frame).unwrap();
///
/// assert_eq!(report.accepted.len(), 1);
/// assert_eq!(canvas.get_pixel(45, 25)[0], 81);
/// ```
pub struct Tracker {
    /// Launch-time parameters.
    config: TrackerConfig,
    /// Frame width fixed by the seed frame.
    width: u32,
    /// Frame height fixed by the seed frame.
    height: u32,
    /// Targets keyed by id, in id order.
    targets: IndexMap<u32, Target>,
    /// Glyphs for id labels.
    label_font: Option<Font<'static>>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.config)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("targets", &self.targets.len())
            .field("labels", &self.label_font.is_some())
            .finish()
    }
}

impl Tracker {
    /// Returns a new Tracker with one target per connected component of the seed frame.
    ///
    /// Ids are assigned from 1 in discovery order and never change.
    ///
    /// # Parameters
    ///
    /// * `config`: Launch-time parameters.
    /// * `seed_index`: Index of the seed frame, for error reporting.
    /// * `seed`: The seed frame. Any non-zero pixel is foreground.
    pub fn new(config: TrackerConfig, seed_index: usize, seed: &GrayImage) -> Result<Tracker> {
        let (width, height) = seed.dimensions();
        let targets = extract_components(seed, &Roi::full(width, height), config.connectivity())
            .into_iter()
            .zip(1..)
            .filter_map(|(mask, id)| Target::new(id, mask))
            .map(|target| (target.id(), target))
            .collect::<IndexMap<_, _>>();

        let count = targets.len() as u32;
        if count == 0 {
            return Err(TrackError::EmptySeedFrame { index: seed_index }.into());
        }
        code(&config, count)?;

        info!(seed = seed_index, targets = count, "seeded tracker");

        Ok(Tracker {
            config,
            width,
            height,
            targets,
            label_font: None,
        })
    }

    /// Set the font used for id labels. Labels are drawn only when the config enables them.
    pub fn with_label_font(&mut self, font: Font<'static>) -> &mut Self {
        self.label_font = Some(font);
        self
    }

    /// Returns true if a label font has been set
    pub fn has_label_font(&self) -> bool {
        self.label_font.is_some()
    }

    /// Return the config
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Return the frame dimensions `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Return the targets in id order
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// Return a target by id
    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.get(&id)
    }

    /// Track every target into `frame`.
    ///
    /// Candidate search runs in parallel across targets. Accepted candidates are then drawn in
    /// id order, and only once every target has been matched is each code checked for on the
    /// canvas: a target whose code is missing is drawn from its stored mask and ages by one frame.
    ///
    /// # Parameters
    ///
    /// * `frame_index`: Index of the frame, for reporting.
    /// * `frame`: The frame, the same size as the seed frame.
    ///
    /// # Returns
    ///
    /// The output canvas and a report of the frame.
    pub fn track(&mut self, frame_index: usize, frame: &GrayImage) -> Result<(GrayImage, FrameReport)> {
        let (width, height) = frame.dimensions();
        if (width, height) != (self.width, self.height) {
            return Err(TrackError::FrameSizeMismatch {
                index: frame_index,
                width,
                height,
                expected_width: self.width,
                expected_height: self.height,
            }
            .into());
        }

        // Step 1
        // Find each target's best candidate inside its search window.
        let config = &self.config;
        let proposals = self
            .targets
            .values()
            .collect::<Vec<_>>()
            .par_iter()
            .filter_map(|target| propose(config, target, frame))
            .collect::<Vec<_>>();

        // Step 2
        // Commit accepted candidates.
        let mut canvas = Canvas::new(width, height);
        let mut accepted = Vec::with_capacity(proposals.len());
        for Proposal {
            id,
            candidate,
            acceptance,
        } in proposals
        {
            canvas.fill(&candidate, code(&self.config, id)?);
            if let Some(target) = self.targets.get_mut(&id) {
                target.accept(candidate, acceptance);
            }
            accepted.push((id, acceptance));
        }

        // Step 3
        // Carry forward every target whose code did not make it onto the canvas.
        let mut carried = vec![];
        for target in self.targets.values_mut() {
            let code = code(&self.config, target.id())?;
            if !canvas.contains(code) {
                canvas.fill(target.mask(), code);
                target.mark_missed();
                carried.push(target.id());
            }
        }

        let escalated = [0, 1, 2].map(|tier| {
            let threshold = self.config.policy().tiers()[tier].staleness;
            self.targets
                .values()
                .filter(|target| target.staleness() > threshold)
                .map(|target| target.id())
                .collect::<Vec<_>>()
        });

        let image = match (&self.label_font, self.config.labeling_enabled()) {
            (Some(font), true) => {
                let labels = self
                    .targets
                    .values()
                    .map(|target| (target.id(), target.centroid()))
                    .collect::<Vec<_>>();
                canvas.into_labelled(font, &labels)
            }
            _ => canvas.into_image(),
        };

        Ok((
            image,
            FrameReport {
                frame_index,
                accepted,
                carried,
                escalated,
            },
        ))
    }
}

/// Returns the output intensity of target `id`.
fn code(config: &TrackerConfig, id: u32) -> Result<u8> {
    Ok(config.code(id).ok_or(TrackError::IntensityOverflow {
        id,
        gray_value: config.gray_value(),
    })?)
}

fn propose(config: &TrackerConfig, target: &Target, frame: &GrayImage) -> Option<Proposal> {
    let (width, height) = frame.dimensions();
    let roi = Roi::around(
        target.centroid(),
        config.roi_width(),
        config.roi_height(),
        width,
        height,
    );
    let best = best_candidate(
        target.mask(),
        extract_components(frame, &roi, config.connectivity()),
    );
    let iou = best.as_ref().map_or(0.0, |best| best.iou);

    match config.policy().accept(target.staleness(), iou) {
        Some(acceptance) => {
            debug!(id = target.id(), ?acceptance, "accepted candidate");
            best.map(|best| Proposal {
                id: target.id(),
                candidate: best.candidate,
                acceptance,
            })
        }
        None => {
            debug!(
                id = target.id(),
                iou,
                staleness = target.staleness(),
                "rejected candidate"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use anyhow::Result;
    use image::{GrayImage, Luma};
    use rusttype::Font;

    static WIDTH: u32 = 256;
    static HEIGHT: u32 = 100;

    fn rect(x: u32, y: u32, width: u32, height: u32) -> Mask {
        Mask::from_fn(WIDTH, HEIGHT, |px, py| {
            px >= x && px < x + width && py >= y && py < y + height
        })
    }

    fn disc(cx: u32, cy: u32, radius: u32) -> Mask {
        Mask::from_fn(WIDTH, HEIGHT, |x, y| {
            let dx = x as i64 - cx as i64;
            let dy = y as i64 - cy as i64;
            dx * dx + dy * dy <= (radius * radius) as i64
        })
    }

    fn frame(masks: &[&Mask]) -> GrayImage {
        GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
            if masks.iter().any(|mask| mask.contains(x, y)) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    fn config() -> TrackerConfig {
        let mut config = TrackerConfig::default();
        config.with_roi(100, 60).with_labeling(false);
        config
    }

    fn painted(image: &GrayImage, code: u8) -> Mask {
        Mask::from_fn(WIDTH, HEIGHT, |x, y| image.get_pixel(x, y)[0] == code)
    }

    #[test]
    fn seed_assigns_ids_and_centroids() -> Result<()> {
        let seed = frame(&[&disc(50, 50, 10), &disc(200, 50, 10)]);
        let tracker = Tracker::new(config(), 0, &seed)?;

        let ids = tracker.targets().map(|t| t.id()).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(tracker.target(1).unwrap().centroid(), (50, 50));
        assert_eq!(tracker.target(2).unwrap().centroid(), (200, 50));
        assert!(tracker.targets().all(|t| t.staleness() == 0));
        Ok(())
    }

    #[test]
    fn identical_frame_is_accepted_strictly() -> Result<()> {
        let seed = frame(&[&disc(50, 50, 10), &disc(200, 50, 10)]);
        let mut tracker = Tracker::new(config(), 0, &seed)?;

        let (canvas, report) = tracker.track(1, &seed)?;
        assert_eq!(
            report.accepted,
            vec![
                (1, Acceptance::Strict { iou: 1.0 }),
                (2, Acceptance::Strict { iou: 1.0 })
            ]
        );
        assert!(report.carried.is_empty());
        assert!(tracker.targets().all(|t| t.staleness() == 0));
        assert_eq!(painted(&canvas, 81), disc(50, 50, 10));
        assert_eq!(painted(&canvas, 82), disc(200, 50, 10));
        Ok(())
    }

    #[test]
    fn reacquires_after_absence() -> Result<()> {
        // 37 px wide, so a 3 px shift scores 34 / 40 = 0.85
        let strand = rect(40, 45, 37, 10);
        let other = rect(180, 45, 20, 10);
        let seed = frame(&[&strand, &other]);
        let mut tracker = Tracker::new(config(), 0, &seed)?;

        tracker.track(1, &seed)?;
        assert_eq!(tracker.target(1).unwrap().staleness(), 0);

        let without = frame(&[&other]);
        for (index, expected) in [(2, 1), (3, 2), (4, 3)] {
            let (canvas, report) = tracker.track(index, &without)?;
            assert_eq!(report.carried, vec![1]);
            assert_eq!(tracker.target(1).unwrap().staleness(), expected);
            assert_eq!(tracker.target(2).unwrap().staleness(), 0);
            // carried forward from the stored shape
            assert_eq!(painted(&canvas, 81), strand);
        }

        let shifted = rect(43, 45, 37, 10);
        let (canvas, report) = tracker.track(5, &frame(&[&shifted, &other]))?;
        assert_eq!(report.accepted[0].0, 1);
        assert!(matches!(
            report.accepted[0].1,
            Acceptance::Relaxed { tier: 1, .. }
        ));
        let target = tracker.target(1).unwrap();
        assert_eq!(target.staleness(), 0);
        assert_eq!(target.centroid(), (61, 49));
        assert_eq!(painted(&canvas, 81), shifted);
        Ok(())
    }

    #[test]
    fn relaxed_match_waits_for_staleness() -> Result<()> {
        let strand = rect(40, 45, 37, 10);
        let seed = frame(&[&strand]);
        let mut tracker = Tracker::new(config(), 0, &seed)?;

        let blank = frame(&[]);
        tracker.track(1, &blank)?;
        tracker.track(2, &blank)?;
        assert_eq!(tracker.target(1).unwrap().staleness(), 2);

        // 0.85 is not enough at staleness 2
        let (_, report) = tracker.track(3, &frame(&[&rect(43, 45, 37, 10)]))?;
        assert!(report.accepted.is_empty());
        assert_eq!(tracker.target(1).unwrap().staleness(), 3);
        assert_eq!(tracker.target(1).unwrap().mask(), &strand);
        assert_eq!(report.escalated, [vec![1], vec![], vec![]]);
        Ok(())
    }

    #[test]
    fn half_overlap_is_carried_forever() -> Result<()> {
        // a 10 px shift of a 30 px strand scores 20 / 40 = 0.5
        let strand = rect(40, 45, 30, 10);
        let mut tracker = Tracker::new(config(), 0, &frame(&[&strand]))?;
        let drifted = frame(&[&rect(50, 45, 30, 10)]);

        for index in 1..=20 {
            let (canvas, report) = tracker.track(index, &drifted)?;
            assert!(report.accepted.is_empty());
            assert_eq!(painted(&canvas, 81), strand);
            assert_eq!(tracker.target(1).unwrap().staleness(), index as u32);
        }
        let (_, report) = tracker.track(21, &drifted)?;
        assert_eq!(report.escalated, [vec![1], vec![1], vec![1]]);
        assert_eq!(tracker.target(1).unwrap().centroid(), (54, 49));
        Ok(())
    }

    #[test]
    fn later_target_overwrites_earlier_fill() -> Result<()> {
        let mut config = config();
        config
            .with_roi(52, 60)
            .with_policy(PatiencePolicy::new(0.3, *PatiencePolicy::default().tiers())?);
        let seed = frame(&[&rect(10, 45, 10, 10), &rect(22, 45, 30, 10)]);
        let mut tracker = Tracker::new(config, 0, &seed)?;

        // both windows see the merged strand; target 1's window crops it at x = 40
        let (canvas, report) = tracker.track(1, &frame(&[&rect(10, 45, 42, 10)]))?;
        let ids = report.accepted.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(report.carried, vec![1]);

        let first = tracker.target(1).unwrap();
        assert_eq!(first.staleness(), 1);
        assert_eq!(first.mask(), &rect(10, 45, 30, 10));
        assert_eq!(first.centroid(), (24, 49));
        assert_eq!(tracker.target(2).unwrap().staleness(), 0);

        // target 2 wrote last, so target 1 only keeps what it redraws from its stored mask
        assert_eq!(painted(&canvas, 81), rect(10, 45, 30, 10));
        assert_eq!(painted(&canvas, 82), rect(40, 45, 12, 10));
        Ok(())
    }

    #[test]
    fn targets_are_never_removed() -> Result<()> {
        let seed = frame(&[&disc(50, 50, 10), &disc(120, 50, 10), &disc(200, 50, 10)]);
        let mut tracker = Tracker::new(config(), 0, &seed)?;
        let frames = [frame(&[]), frame(&[&disc(120, 50, 10)]), seed.clone()];
        for (index, frame) in frames.iter().cycle().take(12).enumerate() {
            tracker.track(index, frame)?;
            let ids = tracker.targets().map(|t| t.id()).collect::<Vec<_>>();
            assert_eq!(ids, vec![1, 2, 3]);
        }
        Ok(())
    }

    #[test]
    fn candidate_outside_window_is_not_found() -> Result<()> {
        let mut tracker = Tracker::new(config(), 0, &frame(&[&rect(40, 45, 20, 10)]))?;
        // the window is 100 wide around x = 49, so x = 150 is out of reach
        let (_, report) = tracker.track(1, &frame(&[&rect(150, 45, 20, 10)]))?;
        assert!(report.accepted.is_empty());
        assert_eq!(report.carried, vec![1]);
        Ok(())
    }

    #[test]
    fn empty_seed_is_fatal() {
        let error = Tracker::new(config(), 7, &frame(&[])).unwrap_err();
        assert_eq!(
            error.downcast_ref::<TrackError>(),
            Some(&TrackError::EmptySeedFrame { index: 7 })
        );
    }

    #[test]
    fn too_many_targets_for_gray_value() {
        let mut config = config();
        config.with_gray_value(253);
        let seed = frame(&[&disc(50, 50, 10), &disc(200, 50, 10)]);
        let error = Tracker::new(config, 0, &seed).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<TrackError>(),
            Some(TrackError::IntensityOverflow { id: 2, .. })
        ));
    }

    #[test]
    fn frame_size_must_match_seed() -> Result<()> {
        let mut tracker = Tracker::new(config(), 0, &frame(&[&disc(50, 50, 10)]))?;
        let error = tracker.track(1, &GrayImage::new(10, 10)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<TrackError>(),
            Some(TrackError::FrameSizeMismatch { index: 1, .. })
        ));
        assert_eq!(tracker.target(1).unwrap().staleness(), 0);
        Ok(())
    }

    #[test]
    fn labels_use_a_reserved_intensity() -> Result<()> {
        let font = Font::try_from_bytes(include_bytes!("../../tracking/DejaVuSans.ttf") as &[u8])
            .unwrap();
        let seed = frame(&[&disc(50, 50, 20), &disc(200, 50, 20)]);
        let mut config = config();
        config.with_labeling(true);
        let mut tracker = Tracker::new(config, 0, &seed)?;
        tracker.with_label_font(font);

        let (canvas, _) = tracker.track(1, &seed)?;
        let label = painted(&canvas, LABEL_INTENSITY);
        assert!(!label.is_empty());
        assert!(canvas.pixels().all(|p| [0, 81, 82, LABEL_INTENSITY].contains(&p[0])));
        Ok(())
    }

    #[test]
    fn labeling_without_font_draws_no_labels() -> Result<()> {
        let seed = frame(&[&disc(50, 50, 20)]);
        let mut config = config();
        config.with_labeling(true);
        let mut tracker = Tracker::new(config, 0, &seed)?;
        assert!(!tracker.has_label_font());

        let (canvas, _) = tracker.track(1, &seed)?;
        assert!(painted(&canvas, LABEL_INTENSITY).is_empty());
        assert_eq!(painted(&canvas, 81), disc(50, 50, 20));
        Ok(())
    }
}
