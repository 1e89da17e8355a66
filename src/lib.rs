#![forbid(unsafe_code)]

//! Core domain model and decision engine for echocardiographic
//! diastolic function / left atrial pressure (LAP) grading.
//!
//! This crate provides:
//! - Domain types (measurement bundle, grades, assessment)
//! - The sinus-rhythm grading chain
//! - The atrial-fibrillation grading chain
//! - Shared null-propagating ratio helpers
//!
//! The engine is pure and synchronous: it never errors and never blocks.
//! Incomplete input degrades to the least-specific truthful grade plus a
//! list of the missing measurements, rather than a refusal.

pub mod af;
pub mod engine;
pub mod logging;
pub mod math;
pub mod sinus;
pub mod types;

// Re-export commonly used types
pub use engine::assess;
pub use types::{Assessment, DerivedRatios, Grade, MeasurementBundle, RhythmMode, Tone};
