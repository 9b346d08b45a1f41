use crate::*;
use anyhow::Result;

/// One relaxation step of the re-acquisition policy.
///
/// A target whose staleness exceeds `staleness` may be re-acquired by a candidate whose
/// intersection over union exceeds `iou`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatienceTier {
    pub staleness: u32,
    pub iou: f32,
}

impl PatienceTier {
    pub fn new(staleness: u32, iou: f32) -> PatienceTier {
        PatienceTier { staleness, iou }
    }
}

/// Enumeration type for the rule that admitted a match
///
/// * `Strict` means the candidate cleared the unconditional threshold.
/// * `Relaxed` means the candidate only cleared the threshold of escalation tier `tier` (1-based).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceptance {
    Strict { iou: f32 },
    Relaxed { tier: usize, iou: f32 },
}

impl Acceptance {
    /// Return the score of the accepted candidate
    pub fn iou(&self) -> f32 {
        match self {
            Acceptance::Strict { iou } | Acceptance::Relaxed { iou, .. } => *iou,
        }
    }
}

/// Tiered patience: the longer a target has gone unmatched, the lower the overlap required to re-acquire it.
#[derive(Debug, Clone, PartialEq)]
pub struct PatiencePolicy {
    /// Threshold that accepts a candidate regardless of staleness.
    strict_iou: f32,
    /// Escalation tiers ordered by increasing staleness.
    tiers: [PatienceTier; 3],
}

impl Default for PatiencePolicy {
    fn default() -> Self {
        Self {
            strict_iou: 0.9,
            tiers: [
                PatienceTier::new(2, 0.8),
                PatienceTier::new(5, 0.7),
                PatienceTier::new(10, 0.6),
            ],
        }
    }
}

impl PatiencePolicy {
    /// Returns a new PatiencePolicy
    ///
    /// # Parameters
    ///
    /// * `strict_iou`: Threshold that accepts a candidate for any target. Default `0.9`.
    /// * `tiers`: Escalation tiers, staleness strictly increasing. Default `(2, 0.8)`, `(5, 0.7)`, `(10, 0.6)`.
    pub fn new(strict_iou: f32, tiers: [PatienceTier; 3]) -> Result<PatiencePolicy> {
        if !tiers.windows(2).all(|pair| pair[0].staleness < pair[1].staleness) {
            return Err(TrackError::InvalidTiers {
                reason: "staleness thresholds must be strictly increasing".to_string(),
            }
            .into());
        }
        let in_range = |iou: f32| (0.0..=1.0).contains(&iou);
        if !in_range(strict_iou) || !tiers.iter().all(|tier| in_range(tier.iou)) {
            return Err(TrackError::InvalidTiers {
                reason: "iou thresholds must lie in [0, 1]".to_string(),
            }
            .into());
        }
        Ok(PatiencePolicy { strict_iou, tiers })
    }

    /// Return the unconditional threshold
    pub fn strict_iou(&self) -> f32 {
        self.strict_iou
    }

    /// Return the escalation tiers
    pub fn tiers(&self) -> &[PatienceTier; 3] {
        &self.tiers
    }

    /// Returns the highest escalation tier reached at `staleness`, `0` when none is.
    pub fn tier(&self, staleness: u32) -> usize {
        self.tiers
            .iter()
            .filter(|tier| staleness > tier.staleness)
            .count()
    }

    /// Decide whether a candidate scoring `iou` re-acquires a target of the given staleness.
    ///
    /// Rules are tried in a fixed order and the first satisfied one wins: the strict threshold,
    /// then each tier in turn.
    pub fn accept(&self, staleness: u32, iou: f32) -> Option<Acceptance> {
        if iou > self.strict_iou {
            return Some(Acceptance::Strict { iou });
        }
        self.tiers
            .iter()
            .position(|tier| staleness > tier.staleness && iou > tier.iou)
            .map(|index| Acceptance::Relaxed {
                tier: index + 1,
                iou,
            })
    }
}
