use crate::*;

/// Compute intersection over union of two masks by pixel count.
///
/// # Returns
///
/// The intersection over union in [0.0, 1.0]. Two empty masks have an empty union and score `0.0`.
pub fn intersection_over_union(a: &Mask, b: &Mask) -> f32 {
    let intersection = a.intersection(b);
    let union = a.area() + b.area() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// The best scoring candidate of a target in the current frame.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    /// The candidate region.
    pub candidate: Mask,
    /// Its intersection over union with the target's previous mask.
    pub iou: f32,
}

/// Select the candidate with the highest intersection over union against `previous`.
///
/// # Parameters
///
/// * `previous`: The target's last accepted (or carried forward) mask.
/// * `candidates`: Components found in the target's search window, in extraction order.
///
/// # Returns
///
/// The first candidate reaching the maximal score, or `None` when no candidate overlaps `previous` at all.
pub fn best_candidate(previous: &Mask, candidates: Vec<Mask>) -> Option<CandidateMatch> {
    let mut best: Option<CandidateMatch> = None;
    let mut max_iou = 0.0;
    for candidate in candidates {
        let iou = intersection_over_union(previous, &candidate);
        if iou > max_iou {
            max_iou = iou;
            best = Some(CandidateMatch { candidate, iou });
        }
    }
    best
}
