use crate::*;
use imageproc::region_labelling::Connectivity;

/// Launch-time parameters of a tracking run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Intensity offset added to a target id to form its output code.
    gray_value: u8,
    /// Width of the search window around a target's centroid.
    roi_width: u32,
    /// Height of the search window around a target's centroid.
    roi_height: u32,
    /// Draw each target's id at its centroid.
    labeling_enabled: bool,
    /// Pixel adjacency for connected components.
    connectivity: Connectivity,
    /// Acceptance thresholds.
    policy: PatiencePolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            gray_value: 80,
            roi_width: 768,
            roi_height: 180,
            labeling_enabled: true,
            connectivity: Connectivity::Eight,
            policy: PatiencePolicy::default(),
        }
    }
}

impl TrackerConfig {
    /// Set gray_value
    pub fn with_gray_value(&mut self, gray_value: u8) -> &mut Self {
        self.gray_value = gray_value;
        self
    }

    /// Set the search window size.
    ///
    /// The window should be at least twice the largest displacement a strand can make between
    /// two frames, otherwise the strand leaves its window and can only be carried forward.
    pub fn with_roi(&mut self, roi_width: u32, roi_height: u32) -> &mut Self {
        self.roi_width = roi_width;
        self.roi_height = roi_height;
        self
    }

    /// Set labeling_enabled
    ///
    /// Labels also need a font, see [`Tracker::with_label_font`]. Without one the flag has no
    /// effect and the canvas carries target codes only.
    pub fn with_labeling(&mut self, labeling_enabled: bool) -> &mut Self {
        self.labeling_enabled = labeling_enabled;
        self
    }

    /// Set connectivity
    pub fn with_connectivity(&mut self, connectivity: Connectivity) -> &mut Self {
        self.connectivity = connectivity;
        self
    }

    /// Set policy
    pub fn with_policy(&mut self, policy: PatiencePolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    pub fn gray_value(&self) -> u8 {
        self.gray_value
    }

    pub fn roi_width(&self) -> u32 {
        self.roi_width
    }

    pub fn roi_height(&self) -> u32 {
        self.roi_height
    }

    pub fn labeling_enabled(&self) -> bool {
        self.labeling_enabled
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn policy(&self) -> &PatiencePolicy {
        &self.policy
    }

    /// Returns the output intensity of target `id`, if it fits below the label intensity.
    pub fn code(&self, id: u32) -> Option<u8> {
        let code = id.checked_add(self.gray_value as u32)?;
        if code < LABEL_INTENSITY as u32 {
            Some(code as u8)
        } else {
            None
        }
    }
}
