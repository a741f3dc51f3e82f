//! In-memory store of measured aspect ratios.
//!
//! Entries arrive as media elements report their natural dimensions. The store only
//! grows while its gallery is alive and is dropped with it. Every real change bumps
//! `revision`, which is what the layout cache keys on; repeated identical
//! measurements (several `loadedmetadata` events for one clip) leave it untouched so
//! they never trigger a relayout.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::models::ItemId;

/// Result of feeding one measurement into the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementOutcome {
    /// Non-positive or non-finite dimensions; nothing recorded.
    Rejected,
    /// Same ratio as already stored.
    Unchanged,
    Inserted(f64),
    Updated { previous: f64, ratio: f64 },
}

impl MeasurementOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Inserted(_) | Self::Updated { .. })
    }
}

#[derive(Debug, Default)]
pub struct AspectRatioStore {
    ratios: HashMap<ItemId, f64>,
    revision: u64,
}

impl AspectRatioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_measurement(
        &mut self,
        id: &ItemId,
        width: f64,
        height: f64,
    ) -> MeasurementOutcome {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            debug!(%id, width, height, "Discarding malformed measurement");
            return MeasurementOutcome::Rejected;
        }

        let ratio = width / height;
        if !ratio.is_finite() || ratio <= 0.0 {
            debug!(%id, width, height, "Discarding measurement with unusable ratio");
            return MeasurementOutcome::Rejected;
        }

        let outcome = match self.ratios.get(id).copied() {
            Some(previous) if previous == ratio => {
                trace!(%id, ratio, "Measurement unchanged");
                return MeasurementOutcome::Unchanged;
            }
            Some(previous) => MeasurementOutcome::Updated { previous, ratio },
            None => MeasurementOutcome::Inserted(ratio),
        };

        self.ratios.insert(id.clone(), ratio);
        self.revision += 1;
        debug!(%id, ratio, revision = self.revision, "Recorded aspect ratio");
        outcome
    }

    pub fn ratio_for(&self, id: &ItemId) -> Option<f64> {
        self.ratios.get(id).copied()
    }

    /// Bumped on every insert or update, never on rejected or unchanged measurements.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}
