/// Parameter registry for the water quality classification service.
///
/// Defines the canonical threshold table: for each measured parameter, the
/// good window and the wider acceptable range whose complement is the bad
/// zone. Anything acceptable but outside the good window is marginal.
/// This is the single source of truth for boundaries; the classifier and
/// its tests reference limits from here rather than hardcoding them.

use crate::model::Parameter;

// ---------------------------------------------------------------------------
// Band edges
// ---------------------------------------------------------------------------

/// One end of a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    /// The edge value belongs to the band.
    Inclusive(f64),
    /// The edge value lies just outside the band.
    Exclusive(f64),
    /// The band is unbounded on this side.
    Open,
}

impl Edge {
    pub const fn value(self) -> Option<f64> {
        match self {
            Edge::Inclusive(v) | Edge::Exclusive(v) => Some(v),
            Edge::Open => None,
        }
    }
}

/// A contiguous interval of parameter values with explicit edge semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: Edge,
    pub upper: Edge,
}

impl Band {
    pub const fn new(lower: Edge, upper: Edge) -> Self {
        Self { lower, upper }
    }

    /// Returns `true` if `value` lies within the band. NaN lies within no band.
    pub fn contains(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        let above_lower = match self.lower {
            Edge::Inclusive(b) => value >= b,
            Edge::Exclusive(b) => value > b,
            Edge::Open => true,
        };
        let below_upper = match self.upper {
            Edge::Inclusive(b) => value <= b,
            Edge::Exclusive(b) => value < b,
            Edge::Open => true,
        };
        above_lower && below_upper
    }
}

// ---------------------------------------------------------------------------
// Parameter metadata
// ---------------------------------------------------------------------------

/// Metadata and thresholds for a single measured parameter.
#[derive(Debug)]
pub struct ParameterSpec {
    pub parameter: Parameter,
    /// Name used at the start of reason strings.
    pub name: &'static str,
    /// Unit appended to values in reason strings, including any separator.
    pub unit_suffix: &'static str,
    /// Ideal window: values here are suitable.
    pub good: Band,
    /// Values outside this band are not suitable.
    pub acceptable: Band,
}

impl ParameterSpec {
    /// The ideal range as shown in reasons, e.g. `"50-400 mg/L"`.
    pub fn ideal_range(&self) -> String {
        let lo = self.good.lower.value().map(|v| v.to_string()).unwrap_or_default();
        let hi = self.good.upper.value().map(|v| v.to_string()).unwrap_or_default();
        format!("{}-{}{}", lo, hi, self.unit_suffix)
    }
}

/// pH: good 6.5–7.8, marginal 6.0–6.5 or 7.8–8.5.
pub static PH: ParameterSpec = ParameterSpec {
    parameter: Parameter::Ph,
    name: "pH",
    unit_suffix: "",
    good: Band::new(Edge::Inclusive(6.5), Edge::Inclusive(7.8)),
    acceptable: Band::new(Edge::Exclusive(6.0), Edge::Inclusive(8.5)),
};

/// TDS: good 50–400 mg/L, marginal below 50 or 400–600 mg/L.
/// There is no lower bad zone.
pub static TDS: ParameterSpec = ParameterSpec {
    parameter: Parameter::Tds,
    name: "TDS",
    unit_suffix: " mg/L",
    good: Band::new(Edge::Inclusive(50.0), Edge::Inclusive(400.0)),
    acceptable: Band::new(Edge::Open, Edge::Inclusive(600.0)),
};

/// Temperature: good 23–25 °C, marginal 21–23 or 25–27 °C.
pub static TEMPERATURE: ParameterSpec = ParameterSpec {
    parameter: Parameter::Temperature,
    name: "Suhu",
    unit_suffix: "°C",
    good: Band::new(Edge::Inclusive(23.0), Edge::Inclusive(25.0)),
    acceptable: Band::new(Edge::Inclusive(21.0), Edge::Inclusive(27.0)),
};

/// Dissolved oxygen: good 4–6 mg/L, marginal 2.5–4 or 6–7 mg/L.
pub static DISSOLVED_OXYGEN: ParameterSpec = ParameterSpec {
    parameter: Parameter::DissolvedOxygen,
    name: "DO",
    unit_suffix: " mg/L",
    good: Band::new(Edge::Inclusive(4.0), Edge::Inclusive(6.0)),
    acceptable: Band::new(Edge::Inclusive(2.5), Edge::Inclusive(7.0)),
};

/// All parameters, in evaluation order.
pub static PARAMETER_REGISTRY: [&ParameterSpec; 4] = [&PH, &TDS, &TEMPERATURE, &DISSOLVED_OXYGEN];

/// Looks up the thresholds for a parameter.
pub fn spec_for(parameter: Parameter) -> &'static ParameterSpec {
    match parameter {
        Parameter::Ph => &PH,
        Parameter::Tds => &TDS,
        Parameter::Temperature => &TEMPERATURE,
        Parameter::DissolvedOxygen => &DISSOLVED_OXYGEN,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
