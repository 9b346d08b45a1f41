use crate::*;

/// A persistently tracked strand cross-section.
///
/// Targets are created once from the seed frame and are never removed; a target that stops
/// matching keeps its last mask and centroid and is carried forward indefinitely.
#[derive(Debug, Clone)]
pub struct Target {
    /// A unique target identifier, starting at 1.
    id: u32,
    /// The last accepted or carried forward region.
    mask: Mask,
    /// Integer centroid of the last accepted region.
    centroid: (u32, u32),
    /// Consecutive frames since the last accepted match.
    staleness: u32,
    /// The rule that admitted the latest match, if any.
    acceptance: Option<Acceptance>,
}

impl Target {
    /// Returns a new Target, or `None` when `mask` is empty.
    pub fn new(id: u32, mask: Mask) -> Option<Target> {
        let centroid = mask.centroid()?;
        Some(Target {
            id,
            mask,
            centroid,
            staleness: 0,
            acceptance: None,
        })
    }

    /// Return the identifier of the target
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Return the current region of the target
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Return the centroid of the target
    pub fn centroid(&self) -> (u32, u32) {
        self.centroid
    }

    /// Return the staleness of the target
    pub fn staleness(&self) -> u32 {
        self.staleness
    }

    /// Return the rule that admitted the latest match
    pub fn acceptance(&self) -> Option<Acceptance> {
        self.acceptance
    }

    /// Take `candidate` as the new region and reset staleness.
    ///
    /// The centroid is kept when the candidate has no pixels.
    pub fn accept(&mut self, candidate: Mask, acceptance: Acceptance) {
        if let Some(centroid) = candidate.centroid() {
            self.centroid = centroid;
        }
        self.mask = candidate;
        self.staleness = 0;
        self.acceptance = Some(acceptance);
    }

    /// Record a frame without an accepted match.
    pub fn mark_missed(&mut self) {
        self.staleness = self.staleness.saturating_add(1);
    }
}
