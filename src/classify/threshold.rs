//! Threshold-based water quality classification.
//!
//! Deterministic fallback used when no model is loaded, and a cross-check
//! for model output. Each parameter is checked independently against the
//! three-tier table in `parameters`, then the per-parameter verdicts are
//! combined with a strict priority rule:
//!
//!   any not suitable  →  NotSuitable (2)
//!   any marginal      →  MarginallySuitable (0)
//!   otherwise         →  Suitable (1)
//!
//! The classifier holds no state and performs no I/O. It is total over all
//! `f64` inputs; NaN falls outside every band and is treated as bad.

use crate::model::{
    ClassificationResult, Detail, Label, Method, Parameter, ParameterVerdict, Reading,
    ThresholdBreakdown,
};
use crate::parameters::spec_for;

/// Classifies a single parameter value against its threshold table.
pub fn evaluate_parameter(parameter: Parameter, value: f64) -> ParameterVerdict {
    let spec = spec_for(parameter);

    let (verdict, tier) = if !spec.acceptable.contains(value) {
        (Label::NotSuitable, "tidak layak")
    } else if !spec.good.contains(value) {
        (Label::MarginallySuitable, "kurang layak")
    } else {
        (Label::Suitable, "")
    };

    // `{:?}` keeps a trailing `.0` on whole numbers, so 700 renders as "700.0".
    let reason = (verdict != Label::Suitable).then(|| {
        format!(
            "{} {} ({:?}{}) - Range layak: {}",
            spec.name,
            tier,
            value,
            spec.unit_suffix,
            spec.ideal_range()
        )
    });

    ParameterVerdict {
        parameter,
        value,
        verdict,
        reason,
    }
}

/// Combines per-parameter verdicts into the overall label.
pub fn aggregate(not_suitable_count: usize, less_suitable_count: usize) -> Label {
    if not_suitable_count > 0 {
        Label::NotSuitable
    } else if less_suitable_count > 0 {
        Label::MarginallySuitable
    } else {
        Label::Suitable
    }
}

/// Classifies a reading with the threshold table.
pub fn classify_reading(reading: &Reading) -> ClassificationResult {
    let verdicts: Vec<ParameterVerdict> = Parameter::ALL
        .iter()
        .map(|&p| evaluate_parameter(p, p.value_in(reading)))
        .collect();

    let not_suitable_count = verdicts
        .iter()
        .filter(|v| v.verdict == Label::NotSuitable)
        .count();
    let less_suitable_count = verdicts
        .iter()
        .filter(|v| v.verdict == Label::MarginallySuitable)
        .count();
    let reasons = verdicts.iter().filter_map(|v| v.reason.clone()).collect();

    let label = aggregate(not_suitable_count, less_suitable_count);

    ClassificationResult {
        classification: label,
        classification_label: label.name(),
        confidence: None,
        method: Method::SimpleThreshold,
        detail: Detail::Threshold(ThresholdBreakdown {
            reasons,
            not_suitable_count,
            less_suitable_count,
            verdicts,
        }),
        note: None,
    }
}

/// Classifies raw readings: pH, TDS (mg/L), temperature (°C), DO (mg/L).
pub fn classify_threshold(
    ph: f64,
    tds: f64,
    temperature: f64,
    dissolved_oxygen: f64,
) -> ClassificationResult {
    classify_reading(&Reading::new(ph, tds, temperature, dissolved_oxygen))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(parameter: Parameter, value: f64) -> Label {
        evaluate_parameter(parameter, value).verdict
    }

    // --- Per-parameter tiers ------------------------------------------------

    #[test]
    fn test_ph_boundaries() {
        assert_eq!(verdict(Parameter::Ph, 5.9), Label::NotSuitable);
        assert_eq!(verdict(Parameter::Ph, 6.0), Label::NotSuitable);
        assert_eq!(verdict(Parameter::Ph, 6.0000001), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Ph, 6.4999), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Ph, 6.5), Label::Suitable);
        assert_eq!(verdict(Parameter::Ph, 7.8), Label::Suitable);
        assert_eq!(verdict(Parameter::Ph, 7.80001), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Ph, 8.5), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Ph, 8.50001), Label::NotSuitable);
    }

    #[test]
    fn test_tds_boundaries() {
        assert_eq!(verdict(Parameter::Tds, 0.0), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Tds, 49.999), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Tds, 50.0), Label::Suitable);
        assert_eq!(verdict(Parameter::Tds, 400.0), Label::Suitable);
        assert_eq!(verdict(Parameter::Tds, 400.001), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Tds, 600.0), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Tds, 600.001), Label::NotSuitable);
    }

    #[test]
    fn test_temperature_boundaries() {
        assert_eq!(verdict(Parameter::Temperature, 20.999), Label::NotSuitable);
        assert_eq!(verdict(Parameter::Temperature, 21.0), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Temperature, 22.999), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Temperature, 23.0), Label::Suitable);
        assert_eq!(verdict(Parameter::Temperature, 25.0), Label::Suitable);
        assert_eq!(verdict(Parameter::Temperature, 25.001), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Temperature, 27.0), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::Temperature, 27.001), Label::NotSuitable);
    }

    #[test]
    fn test_dissolved_oxygen_boundaries() {
        assert_eq!(verdict(Parameter::DissolvedOxygen, 2.499), Label::NotSuitable);
        assert_eq!(verdict(Parameter::DissolvedOxygen, 2.5), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::DissolvedOxygen, 3.999), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::DissolvedOxygen, 4.0), Label::Suitable);
        assert_eq!(verdict(Parameter::DissolvedOxygen, 6.0), Label::Suitable);
        assert_eq!(verdict(Parameter::DissolvedOxygen, 6.001), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::DissolvedOxygen, 7.0), Label::MarginallySuitable);
        assert_eq!(verdict(Parameter::DissolvedOxygen, 7.001), Label::NotSuitable);
    }

    #[test]
    fn test_nan_is_not_suitable() {
        for p in Parameter::ALL {
            assert_eq!(verdict(p, f64::NAN), Label::NotSuitable);
        }
    }

    // --- Reasons ------------------------------------------------------------

    #[test]
    fn test_suitable_verdict_has_no_reason() {
        assert_eq!(evaluate_parameter(Parameter::Ph, 7.0).reason, None);
    }

    #[test]
    fn test_reason_formats() {
        let reason = |p, v| evaluate_parameter(p, v).reason.expect("non-suitable has reason");
        assert_eq!(
            reason(Parameter::Ph, 6.2),
            "pH kurang layak (6.2) - Range layak: 6.5-7.8"
        );
        assert_eq!(
            reason(Parameter::Tds, 700.0),
            "TDS tidak layak (700.0 mg/L) - Range layak: 50-400 mg/L"
        );
        assert_eq!(
            reason(Parameter::Temperature, 30.0),
            "Suhu tidak layak (30.0°C) - Range layak: 23-25°C"
        );
        assert_eq!(
            reason(Parameter::DissolvedOxygen, 6.5),
            "DO kurang layak (6.5 mg/L) - Range layak: 4-6 mg/L"
        );
    }

    // --- Aggregation --------------------------------------------------------

    #[test]
    fn test_aggregate_priority() {
        assert_eq!(aggregate(0, 0), Label::Suitable);
        assert_eq!(aggregate(0, 3), Label::MarginallySuitable);
        assert_eq!(aggregate(1, 0), Label::NotSuitable);
        assert_eq!(aggregate(1, 3), Label::NotSuitable);
    }

    #[test]
    fn test_verdicts_kept_in_evaluation_order() {
        let result = classify_threshold(7.0, 200.0, 24.0, 5.0);
        let order: Vec<_> = result
            .threshold()
            .expect("threshold result")
            .verdicts
            .iter()
            .map(|v| v.parameter)
            .collect();
        assert_eq!(order, Parameter::ALL.to_vec());
    }
}
