//! Entry point for the grading engine.
//!
//! Dispatches a measurement bundle to the rule chain selected by its
//! rhythm mode. The engine is a pure function of the bundle: no I/O, no
//! shared state, and identical input always yields an identical
//! assessment, trace order included.

use crate::types::{Assessment, MeasurementBundle, RhythmMode};
use crate::{af, sinus};

/// Grade a measurement bundle
pub fn assess(bundle: &MeasurementBundle) -> Assessment {
    tracing::debug!("Assessing bundle in {:?} mode", bundle.rhythm);

    match bundle.rhythm {
        RhythmMode::Sinus => sinus::assess(bundle),
        RhythmMode::AtrialFibrillation => af::assess(bundle),
    }
}
