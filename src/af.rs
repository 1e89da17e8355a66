//! Atrial-fibrillation grading chain.
//!
//! A distinct decision table from the sinus chain, not a variant of it:
//! different primary criteria, strict (not inclusive) right-heart pressure
//! cut-points, and a smaller grade vocabulary (Normal LAP / Indeterminate /
//! Elevated LAP). The A wave is not used, so E/A is never derived here.
//!
//! Stages, first conclusive stage terminal:
//! 1. Missingness advisories
//! 2. Primary-criteria tally (0-4)
//! 3. Tally <= 1 exit (Normal LAP)
//! 4. Tally >= 3 exit (Elevated LAP)
//! 5. Tally == 2: secondary-criteria tie-break

use crate::math::{above, at_least, at_most, average2, below, guarded_div};
use crate::types::{Assessment, DerivedRatios, Grade, MeasurementBundle, Tone};

// Published cut-points for the AF branch
const MITRAL_E_HIGH: f64 = 100.0;
const SEPTAL_E_OVER_E_PRIME_HIGH: f64 = 11.0;
const TR_VMAX_HIGH: f64 = 2.8;
const PASP_HIGH: f64 = 35.0;
const DECEL_TIME_SHORT: f64 = 160.0;
const LARS_LOW: f64 = 18.0;
const PV_S_D_LOW: f64 = 1.0;
const BMI_HIGH: f64 = 30.0;

/// Grade one atrial-fibrillation bundle
pub fn assess(bundle: &MeasurementBundle) -> Assessment {
    let mut trace: Vec<String> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    let derived = derive_ratios(bundle);

    // Stage 1: missingness advisories
    if bundle.mitral_e.is_none() {
        missing.push("mitral E velocity".to_string());
    }
    if bundle.e_prime_septal.is_none() {
        missing.push("septal e'".to_string());
    }
    if bundle.tr_vmax.is_none() && bundle.pasp.is_none() {
        missing.push("TR Vmax / PASP".to_string());
    }
    if bundle.decel_time.is_none() {
        missing.push("deceleration time".to_string());
    }

    // Stage 2: primary-criteria tally. The septal E/e' ratio here is
    // intentionally computed against the septal annulus alone, not the
    // averaged e' used for display.
    let septal_e_over_e_prime = guarded_div(bundle.mitral_e, bundle.e_prime_septal);

    let high_mitral_e = at_least(bundle.mitral_e, MITRAL_E_HIGH);
    let high_septal_ratio = above(septal_e_over_e_prime, SEPTAL_E_OVER_E_PRIME_HIGH);
    let high_rh_pressure = above(bundle.tr_vmax, TR_VMAX_HIGH) || above(bundle.pasp, PASP_HIGH);
    let short_decel_time = at_most(bundle.decel_time, DECEL_TIME_SHORT);

    let tally = [
        high_mitral_e,
        high_septal_ratio,
        high_rh_pressure,
        short_decel_time,
    ]
    .iter()
    .filter(|&&c| c)
    .count();
    trace.push(format!("primary criteria positive: {tally}/4"));
    tracing::debug!("AF primary criteria tally: {}/4", tally);

    // Stage 3: low tally exit
    if tally <= 1 {
        return Assessment::conclude(
            Grade::NormalLap,
            "At most one primary criterion positive.",
            Tone::Green,
            derived,
            trace,
            missing,
        );
    }

    // Stage 4: high tally exit
    if tally >= 3 {
        return Assessment::conclude(
            Grade::ElevatedLap,
            "Three or more primary criteria positive.",
            Tone::Red,
            derived,
            trace,
            missing,
        );
    }

    // Stage 5: tally == 2, secondary-criteria tie-break. Only inputs that
    // are present count toward availability.
    let mut positive = 0;
    let mut available = 0;

    if bundle.lars.is_some() {
        available += 1;
        if below(bundle.lars, LARS_LOW) {
            positive += 1;
        }
    }
    if bundle.pv_s_d_ratio.is_some() {
        available += 1;
        if below(bundle.pv_s_d_ratio, PV_S_D_LOW) {
            positive += 1;
        }
    }
    if bundle.bmi.is_some() {
        available += 1;
        if above(bundle.bmi, BMI_HIGH) {
            positive += 1;
        }
    }

    trace.push(format!(
        "secondary criteria: {positive} positive / {available} available"
    ));
    tracing::debug!(
        "AF secondary criteria: {} positive / {} available",
        positive,
        available
    );

    if available == 0 {
        return Assessment::conclude(
            Grade::Indeterminate,
            "Two primary criteria positive but no secondary criterion available.",
            Tone::Amber,
            derived,
            trace,
            missing,
        );
    }

    match positive {
        p if p >= 2 => Assessment::conclude(
            Grade::ElevatedLap,
            "Two primary criteria positive, confirmed by secondary criteria.",
            Tone::Red,
            derived,
            trace,
            missing,
        ),
        0 => Assessment::conclude(
            Grade::NormalLap,
            "Two primary criteria positive but all secondary criteria negative.",
            Tone::Green,
            derived,
            trace,
            missing,
        ),
        _ => Assessment::conclude(
            Grade::Indeterminate,
            "Two primary criteria positive with a single positive secondary criterion.",
            Tone::Amber,
            derived,
            trace,
            missing,
        ),
    }
}

/// E/A is never derived in AF; the average e' and the averaged E/e' are
/// still exposed for display.
fn derive_ratios(bundle: &MeasurementBundle) -> DerivedRatios {
    let e_prime_avg = average2(bundle.e_prime_septal, bundle.e_prime_lateral);
    DerivedRatios {
        e_a_ratio: None,
        e_over_e_prime: guarded_div(bundle.mitral_e, e_prime_avg),
        e_prime_avg,
    }
}
