//! Core domain types for diastolic function / LAP grading.
//!
//! This module defines the fundamental types used throughout the engine:
//! - The measurement bundle and rhythm mode
//! - Grade and severity-tone vocabularies
//! - Derived ratios and the final assessment record

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Input Types
// ============================================================================

/// Cardiac rhythm during the study, selecting which grading chain applies
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RhythmMode {
    #[default]
    Sinus,
    AtrialFibrillation,
}

/// One study's measurements.
///
/// Every field is optional: `None` means "not measured" and must never be
/// conflated with zero. A measurement participates in a rule only when
/// present; absence removes that rule's vote rather than counting against.
/// Callers are responsible for normalizing unparseable or non-finite raw
/// input to `None` before building a bundle.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MeasurementBundle {
    pub rhythm: RhythmMode,

    // Mitral inflow (cm/s); A wave is meaningful in sinus rhythm only
    pub mitral_e: Option<f64>,
    pub mitral_a: Option<f64>,

    // Tissue Doppler e' (cm/s); lateral is unused by the AF chain
    pub e_prime_septal: Option<f64>,
    pub e_prime_lateral: Option<f64>,

    // Right-heart pressure proxies; either may substitute for the other
    pub tr_vmax: Option<f64>, // m/s
    pub pasp: Option<f64>,    // mmHg

    // Confirmatory / secondary variables
    pub lavi: Option<f64>,        // mL/m²
    pub lars: Option<f64>,        // %
    pub pv_s_d_ratio: Option<f64>,
    pub ivrt: Option<f64>,        // ms, sinus only

    // AF-only variables
    pub decel_time: Option<f64>, // ms
    pub bmi: Option<f64>,        // kg/m²
}

// ============================================================================
// Outcome Types
// ============================================================================

/// Grade label, covering both the sinus and the AF vocabularies
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    NormalDf,
    Grade1,
    Grade2,
    Grade3,
    Indeterminate,
    IncreasedLapGradeUnknown,
    NormalLap,
    ElevatedLap,
}

impl Grade {
    /// Human-readable label, matching the published algorithm's wording
    pub fn label(&self) -> &'static str {
        match self {
            Grade::NormalDf => "Normal DF",
            Grade::Grade1 => "Grade 1",
            Grade::Grade2 => "Grade 2",
            Grade::Grade3 => "Grade 3",
            Grade::Indeterminate => "Indeterminate",
            Grade::IncreasedLapGradeUnknown => "Increased LAP (grade unknown)",
            Grade::NormalLap => "Normal LAP",
            Grade::ElevatedLap => "Elevated LAP",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity tone for display classification only; carries no medical logic
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Green,
    Blue,
    Amber,
    Red,
    Gray,
}

/// Ratios derived from the bundle, each independently nullable.
///
/// `e_a_ratio` is `None` by construction in AF mode (the A wave is not
/// used there).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DerivedRatios {
    pub e_a_ratio: Option<f64>,
    pub e_prime_avg: Option<f64>,
    pub e_over_e_prime: Option<f64>,
}

/// The final assessment for one bundle.
///
/// Constructed fresh per invocation and never mutated afterwards. The
/// trace is append-only audit output recording which rule stages fired
/// and their tallies, in evaluation order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    pub grade: Grade,
    pub rationale: String,
    pub tone: Tone,
    pub derived: DerivedRatios,
    pub trace: Vec<String>,
    pub missing: Vec<String>,
}

impl Assessment {
    /// Pack a terminal rule-chain outcome into the final record.
    ///
    /// Pure aggregation; no grading logic lives here.
    pub fn conclude(
        grade: Grade,
        rationale: impl Into<String>,
        tone: Tone,
        derived: DerivedRatios,
        trace: Vec<String>,
        missing: Vec<String>,
    ) -> Self {
        Assessment {
            grade,
            rationale: rationale.into(),
            tone,
            derived,
            trace,
            missing,
        }
    }
}
