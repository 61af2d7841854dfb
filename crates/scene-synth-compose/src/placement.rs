use rand::Rng;
use scene_synth_core::{Mask, PlaceableIntegral, Placement};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters for [`PlacementSampler`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Upper bound on candidate draws per search.
    pub max_attempts: u32,
    /// Minimal fraction of the footprint that must be placeable.
    pub min_coverage: f64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            min_coverage: 0.5,
        }
    }
}

/// Outcome of one placement search.
///
/// `NotFound` is an ordinary result (the foreground may simply be too big
/// for the placeable region), not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementResult {
    Placed { placement: Placement, attempts: u32 },
    NotFound { attempts: u32 },
}

impl PlacementResult {
    pub fn placement(&self) -> Option<Placement> {
        match *self {
            Self::Placed { placement, .. } => Some(placement),
            Self::NotFound { .. } => None,
        }
    }

    /// Candidates drawn before the search stopped.
    pub fn attempts(&self) -> u32 {
        match *self {
            Self::Placed { attempts, .. } | Self::NotFound { attempts } => attempts,
        }
    }
}

/// Rejection sampler for foreground top-left corners.
///
/// Candidates are drawn uniformly, with replacement, from the placeable
/// pixels of the mask. A candidate is accepted when the whole footprint
/// fits in the background and at least `min_coverage` of the mask pixels
/// under it are placeable.
#[derive(Clone, Debug, Default)]
pub struct PlacementSampler {
    params: PlacementParams,
}

impl PlacementSampler {
    pub fn new(params: PlacementParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PlacementParams {
        &self.params
    }

    /// Search for a corner for a `foreground_size` footprint on a
    /// `background_size` background.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, mask, rng))
    )]
    pub fn sample<R: Rng + ?Sized>(
        &self,
        background_size: (u32, u32),
        foreground_size: (u32, u32),
        mask: &Mask,
        rng: &mut R,
    ) -> PlacementResult {
        let candidates = mask.placeable_indices();
        if candidates.is_empty() {
            log::debug!("placement: mask has no placeable pixels");
            return PlacementResult::NotFound { attempts: 0 };
        }

        let integral = PlaceableIntegral::new(mask);
        let mask_width = mask.width();

        for attempt in 1..=self.params.max_attempts {
            let idx = candidates[rng.random_range(0..candidates.len())];
            let candidate = Placement::new(idx % mask_width, idx / mask_width);
            if self.accepts(candidate, background_size, foreground_size, &integral) {
                log::debug!(
                    "placement: accepted ({}, {}) after {} attempts",
                    candidate.x,
                    candidate.y,
                    attempt
                );
                return PlacementResult::Placed {
                    placement: candidate,
                    attempts: attempt,
                };
            }
        }

        log::debug!(
            "placement: no corner for {}x{} within {} attempts",
            foreground_size.0,
            foreground_size.1,
            self.params.max_attempts
        );
        PlacementResult::NotFound {
            attempts: self.params.max_attempts,
        }
    }

    /// Acceptance test for a single candidate corner.
    pub fn accepts(
        &self,
        candidate: Placement,
        background_size: (u32, u32),
        foreground_size: (u32, u32),
        integral: &PlaceableIntegral,
    ) -> bool {
        let (fw, fh) = foreground_size;
        let footprint = candidate.footprint(fw, fh);
        if footprint.is_empty() || !footprint.fits_within(background_size.0, background_size.1) {
            return false;
        }
        let covered = integral.count_in(&footprint) as f64;
        covered / footprint.area() as f64 >= self.params.min_coverage
    }
}
