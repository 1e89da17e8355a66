//! Sinus-rhythm grading chain.
//!
//! Stages run in a fixed order and the first conclusive stage is terminal:
//! 1. Missingness advisories (never block computation)
//! 2. Top-tier marker tally (reduced e', high E/e', high right-heart pressure)
//! 3. All-normal exit
//! 4. Isolated reduced-e' exit (requires E/A <= 0.8, otherwise falls through)
//! 5. Confirmatory-variable availability check
//! 6. LAP confirmation
//! 7. Grade assignment under elevated LAP
//!
//! Later stages assume earlier ones already returned; the order must not
//! be changed.

use crate::math::{above, at_least, at_most, average2, guarded_div};
use crate::types::{Assessment, DerivedRatios, Grade, MeasurementBundle, Tone};

// Published cut-points for the sinus branch
const SEPTAL_E_PRIME_LOW: f64 = 6.0;
const LATERAL_E_PRIME_LOW: f64 = 7.0;
const AVG_E_PRIME_LOW: f64 = 6.5;
const E_OVER_E_PRIME_HIGH: f64 = 14.0;
const TR_VMAX_HIGH: f64 = 2.8;
const PASP_HIGH: f64 = 35.0;
const E_A_GRADE1_MAX: f64 = 0.8;
const E_A_GRADE3_MIN: f64 = 2.0;
const PV_S_D_LOW: f64 = 0.67;
const LARS_LOW: f64 = 18.0;
const LAVI_HIGH: f64 = 34.0;
const IVRT_LOW: f64 = 70.0;

/// Grade one sinus-rhythm bundle
pub fn assess(bundle: &MeasurementBundle) -> Assessment {
    let mut trace: Vec<String> = Vec::new();
    let mut missing: Vec<String> = Vec::new();

    let derived = derive_ratios(bundle);

    // Stage 1: missingness advisories, computed alongside the grade
    if bundle.mitral_e.is_none() {
        missing.push("mitral E velocity".to_string());
    }
    if bundle.mitral_a.is_none() {
        missing.push("mitral A velocity".to_string());
    }
    if bundle.e_prime_septal.is_none() && bundle.e_prime_lateral.is_none() {
        missing.push("tissue Doppler e' (septal or lateral)".to_string());
    }

    // Stage 2: top-tier marker tally
    let reduced_e_prime = at_most(bundle.e_prime_septal, SEPTAL_E_PRIME_LOW)
        || at_most(bundle.e_prime_lateral, LATERAL_E_PRIME_LOW)
        || at_most(derived.e_prime_avg, AVG_E_PRIME_LOW);
    let high_e_over_e_prime = at_least(derived.e_over_e_prime, E_OVER_E_PRIME_HIGH);
    let high_rh_pressure =
        at_least(bundle.tr_vmax, TR_VMAX_HIGH) || at_least(bundle.pasp, PASP_HIGH);

    trace.push(format!("reduced e' marker: {}", yes_no(reduced_e_prime)));
    trace.push(format!(
        "E/average-e' >= 14 marker: {}",
        yes_no(high_e_over_e_prime)
    ));
    trace.push(format!(
        "elevated TR Vmax / PASP marker: {}",
        yes_no(high_rh_pressure)
    ));

    let tally = [reduced_e_prime, high_e_over_e_prime, high_rh_pressure]
        .iter()
        .filter(|&&m| m)
        .count();
    trace.push(format!("top-tier marker tally: {tally}/3"));
    tracing::debug!("Sinus top-tier marker tally: {}/3", tally);

    // Stage 3: all-normal exit
    if tally == 0 {
        return Assessment::conclude(
            Grade::NormalDf,
            "All top-tier markers negative.",
            Tone::Green,
            derived,
            trace,
            missing,
        );
    }

    // Stage 4: isolated reduced-e' exit
    if tally == 1 && reduced_e_prime {
        match derived.e_a_ratio {
            Some(e_a) if e_a <= E_A_GRADE1_MAX => {
                trace.push("isolated reduced e' with E/A <= 0.8".to_string());
                return Assessment::conclude(
                    Grade::Grade1,
                    "Isolated reduced e' with E/A <= 0.8.",
                    Tone::Blue,
                    derived,
                    trace,
                    missing,
                );
            }
            _ => {
                // No short-circuit: defer to the confirmatory variables
                trace.push(
                    "isolated reduced e' without E/A <= 0.8, deferring to confirmatory variables"
                        .to_string(),
                );
            }
        }
    }

    // Stage 5: confirmatory-variable availability
    let confirmatory_available = bundle.pv_s_d_ratio.is_some()
        || bundle.lars.is_some()
        || bundle.lavi.is_some()
        || bundle.ivrt.is_some();
    if !confirmatory_available {
        trace.push("no confirmatory variable available".to_string());
        return Assessment::conclude(
            Grade::Indeterminate,
            "Abnormal top-tier markers; at least one confirmatory variable (PV S/D, LARS, LAVI, IVRT) is required.",
            Tone::Amber,
            derived,
            trace,
            missing,
        );
    }

    // Stage 6: LAP confirmation
    let lap_elevated = at_most(bundle.pv_s_d_ratio, PV_S_D_LOW)
        || at_most(bundle.lars, LARS_LOW)
        || above(bundle.lavi, LAVI_HIGH)
        || at_most(bundle.ivrt, IVRT_LOW);
    trace.push(format!(
        "LAP confirmation: {}",
        if lap_elevated { "elevated" } else { "not elevated" }
    ));
    tracing::debug!("Sinus LAP confirmation: elevated = {}", lap_elevated);

    if !lap_elevated {
        return Assessment::conclude(
            Grade::Indeterminate,
            "Top-tier markers abnormal but LAP elevation not confirmed.",
            Tone::Amber,
            derived,
            trace,
            missing,
        );
    }

    // Stage 7: grade assignment under elevated LAP, requires E/A
    match derived.e_a_ratio {
        None => Assessment::conclude(
            Grade::IncreasedLapGradeUnknown,
            "LAP elevated but E/A unavailable; grade cannot be assigned.",
            Tone::Red,
            derived,
            trace,
            missing,
        ),
        Some(e_a) if e_a >= E_A_GRADE3_MIN => Assessment::conclude(
            Grade::Grade3,
            "LAP elevated with E/A >= 2.",
            Tone::Red,
            derived,
            trace,
            missing,
        ),
        Some(_) => Assessment::conclude(
            Grade::Grade2,
            "LAP elevated with E/A < 2.",
            Tone::Red,
            derived,
            trace,
            missing,
        ),
    }
}

fn derive_ratios(bundle: &MeasurementBundle) -> DerivedRatios {
    let e_prime_avg = average2(bundle.e_prime_septal, bundle.e_prime_lateral);
    DerivedRatios {
        e_a_ratio: guarded_div(bundle.mitral_e, bundle.mitral_a),
        e_over_e_prime: guarded_div(bundle.mitral_e, e_prime_avg),
        e_prime_avg,
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sinus_bundle() -> MeasurementBundle {
        MeasurementBundle {
            rhythm: crate::types::RhythmMode::Sinus,
            ..Default::default()
        }
    }

    #[test]
    fn test_all_markers_negative_is_normal_df() {
        // E=80, A=60, e' 7/10, TR 2.6: every marker false
        let bundle = MeasurementBundle {
            mitral_e: Some(80.0),
            mitral_a: Some(60.0),
            e_prime_septal: Some(7.0),
            e_prime_lateral: Some(10.0),
            tr_vmax: Some(2.6),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::NormalDf);
        assert_eq!(result.tone, Tone::Green);
        assert_eq!(result.derived.e_a_ratio, Some(1.33));
        assert_eq!(result.derived.e_prime_avg, Some(8.5));
        assert_eq!(result.derived.e_over_e_prime, Some(9.41));
        assert!(result.trace.iter().any(|l| l.contains("0/3")));
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_normal_df_ignores_confirmatory_inputs() {
        // Abnormal LAVI must not matter when the top-tier tally is 0
        let bundle = MeasurementBundle {
            mitral_e: Some(80.0),
            mitral_a: Some(60.0),
            e_prime_septal: Some(7.0),
            e_prime_lateral: Some(10.0),
            lavi: Some(50.0),
            lars: Some(10.0),
            ..sinus_bundle()
        };

        assert_eq!(assess(&bundle).grade, Grade::NormalDf);
    }

    #[test]
    fn test_isolated_reduced_e_prime_with_low_e_a_is_grade_1() {
        // Only the reduced-e' marker fires (septal 5 <= 6; E/avg-e' 7.14,
        // no TR/PASP) and E/A = 50/70 = 0.71 <= 0.8
        let bundle = MeasurementBundle {
            mitral_e: Some(50.0),
            mitral_a: Some(70.0),
            e_prime_septal: Some(5.0),
            e_prime_lateral: Some(9.0),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::Grade1);
        assert_eq!(result.tone, Tone::Blue);
        assert_eq!(result.derived.e_a_ratio, Some(0.71));
        assert!(result.trace.iter().any(|l| l.contains("tally: 1/3")));
    }

    #[test]
    fn test_isolated_reduced_e_prime_without_e_a_falls_through() {
        // Reduced e' only (septal 5 <= 6; avg 7 and E/avg-e' 12.86 both
        // below their cut-points), E/A absent, no confirmatory variables
        let bundle = MeasurementBundle {
            mitral_e: Some(90.0),
            e_prime_septal: Some(5.0),
            e_prime_lateral: Some(9.0),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::Indeterminate);
        assert_eq!(result.tone, Tone::Amber);
        assert!(result
            .trace
            .iter()
            .any(|l| l.contains("deferring to confirmatory")));
    }

    #[test]
    fn test_isolated_reduced_e_prime_with_high_e_a_falls_through() {
        // E/A 1.5 > 0.8, so stage 4 must not short-circuit; LAVI confirms LAP
        let bundle = MeasurementBundle {
            mitral_e: Some(90.0),
            mitral_a: Some(60.0),
            e_prime_septal: Some(5.0),
            e_prime_lateral: Some(9.0),
            lavi: Some(40.0),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::Grade2);
        assert_eq!(result.tone, Tone::Red);
    }

    #[test]
    fn test_no_confirmatory_variables_is_indeterminate() {
        // Two markers abnormal, nothing to confirm LAP with
        let bundle = MeasurementBundle {
            mitral_e: Some(140.0),
            mitral_a: Some(100.0),
            e_prime_septal: Some(5.0),
            e_prime_lateral: Some(5.0),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::Indeterminate);
        assert!(result.rationale.contains("confirmatory"));
    }

    #[test]
    fn test_lap_not_confirmed_is_indeterminate() {
        let bundle = MeasurementBundle {
            mitral_e: Some(140.0),
            mitral_a: Some(100.0),
            e_prime_septal: Some(5.0),
            e_prime_lateral: Some(5.0),
            lavi: Some(30.0), // below the > 34 cut-point
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::Indeterminate);
        assert!(result.trace.iter().any(|l| l.contains("not elevated")));
    }

    #[test]
    fn test_elevated_lap_with_e_a_exactly_two_is_grade_3() {
        // Boundary is inclusive: E/A = 140/70 = 2.00
        let bundle = MeasurementBundle {
            mitral_e: Some(140.0),
            mitral_a: Some(70.0),
            e_prime_septal: Some(5.0),
            e_prime_lateral: Some(5.0),
            lavi: Some(40.0),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::Grade3);
        assert_eq!(result.tone, Tone::Red);
        assert_eq!(result.derived.e_a_ratio, Some(2.0));
    }

    #[test]
    fn test_elevated_lap_without_e_a_is_grade_unknown() {
        let bundle = MeasurementBundle {
            mitral_e: Some(140.0),
            e_prime_septal: Some(5.0),
            e_prime_lateral: Some(5.0),
            ivrt: Some(60.0),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert_eq!(result.grade, Grade::IncreasedLapGradeUnknown);
        assert_eq!(result.tone, Tone::Red);
        assert!(result.missing.contains(&"mitral A velocity".to_string()));
    }

    #[test]
    fn test_tr_vmax_boundary_is_inclusive() {
        // TR Vmax exactly 2.8 fires the sinus marker (>=)
        let bundle = MeasurementBundle {
            mitral_e: Some(80.0),
            mitral_a: Some(60.0),
            e_prime_septal: Some(7.0),
            e_prime_lateral: Some(10.0),
            tr_vmax: Some(2.8),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert!(result.trace.iter().any(|l| l.contains("tally: 1/3")));
        assert_ne!(result.grade, Grade::NormalDf);
    }

    #[test]
    fn test_pasp_substitutes_for_tr_vmax() {
        let bundle = MeasurementBundle {
            mitral_e: Some(80.0),
            mitral_a: Some(60.0),
            e_prime_septal: Some(7.0),
            e_prime_lateral: Some(10.0),
            pasp: Some(40.0),
            ..sinus_bundle()
        };

        assert!(assess(&bundle)
            .trace
            .iter()
            .any(|l| l.contains("elevated TR Vmax / PASP marker: yes")));
    }

    #[test]
    fn test_missing_advisories_reflect_absent_fields_only() {
        let bundle = MeasurementBundle {
            mitral_e: Some(80.0),
            e_prime_septal: Some(7.0),
            ..sinus_bundle()
        };

        let result = assess(&bundle);

        assert!(!result.missing.iter().any(|m| m.contains("mitral E")));
        assert!(result.missing.contains(&"mitral A velocity".to_string()));
        assert!(!result.missing.iter().any(|m| m.contains("tissue Doppler")));
    }

    #[test]
    fn test_empty_bundle_degrades_without_failing() {
        let result = assess(&sinus_bundle());

        // No marker can vote, so the tally is 0
        assert_eq!(result.grade, Grade::NormalDf);
        assert_eq!(result.missing.len(), 3);
        assert_eq!(result.derived, DerivedRatios::default());
    }
}
