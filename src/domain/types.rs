//! Shared domain types.
//!
//! These mirror the on-disk JSON model files one-to-one so they can be:
//!
//! - deserialized straight from `model_config.json` and the crosswalk files
//! - passed by reference into the scoring/routing operations
//! - echoed back in `check` summaries

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Assessment domain label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    /// Physical function.
    #[serde(rename = "PF")]
    Pf,
    /// Pain interference.
    #[serde(rename = "PI")]
    Pi,
    /// Fatigue.
    #[serde(rename = "F")]
    F,
    /// Social roles.
    #[serde(rename = "SR")]
    Sr,
    /// Anxiety.
    #[serde(rename = "A")]
    A,
    /// Depression.
    #[serde(rename = "D")]
    D,
}

impl Domain {
    pub const ALL: [Domain; 6] = [Domain::Pf, Domain::Pi, Domain::F, Domain::Sr, Domain::A, Domain::D];

    /// Wire label (`"PF"`, `"PI"`, ...).
    pub fn code(self) -> &'static str {
        match self {
            Domain::Pf => "PF",
            Domain::Pi => "PI",
            Domain::F => "F",
            Domain::Sr => "SR",
            Domain::A => "A",
            Domain::D => "D",
        }
    }

    /// Anxiety and depression get the second-pass rule instead of the plain
    /// stop-SE check.
    pub fn second_pass_eligible(self) -> bool {
        matches!(self, Domain::A | Domain::D)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a label is not one of the six domain codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDomain(pub String);

impl fmt::Display for UnknownDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown domain '{}'", self.0)
    }
}

impl std::error::Error for UnknownDomain {}

impl FromStr for Domain {
    type Err = UnknownDomain;

    /// Exact, case-sensitive match on the wire label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.code() == s)
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// Closed interval `[lo, hi]` used to clamp calibrated output.
///
/// Serialized as a two-element array, as in the model files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ClipRange {
    pub lo: f64,
    pub hi: f64,
}

impl ClipRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn is_well_formed(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo <= self.hi
    }
}

impl From<[f64; 2]> for ClipRange {
    fn from([lo, hi]: [f64; 2]) -> Self {
        Self { lo, hi }
    }
}

impl From<ClipRange> for [f64; 2] {
    fn from(value: ClipRange) -> Self {
        [value.lo, value.hi]
    }
}

/// Per-domain score transformation, tagged by `type` in the crosswalk file.
///
/// Deserialized through [`XwalkRecord`] rather than serde's tagged-enum
/// path, which buffers values and cannot hand exact-precision numbers back
/// as `f64`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Xwalk {
    /// `slope * t + intercept`.
    Linear {
        slope: f64,
        intercept: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clip: Option<ClipRange>,
    },
    /// Two-knot hinge spline: `a + b*t + c*(t-k1)+ + d*(t-k2)+`.
    Piecewise {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        knots: [f64; 2],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clip: Option<ClipRange>,
    },
}

/// Flat view of a crosswalk file, before the `type` decides which fields
/// are required.
#[derive(Deserialize)]
struct XwalkRecord {
    #[serde(rename = "type")]
    kind: CalibrationMethod,
    slope: Option<f64>,
    intercept: Option<f64>,
    a: Option<f64>,
    b: Option<f64>,
    c: Option<f64>,
    d: Option<f64>,
    knots: Option<[f64; 2]>,
    #[serde(default)]
    clip: Option<ClipRange>,
}

fn required<T>(value: Option<T>, field: &str, kind: CalibrationMethod) -> Result<T, String> {
    value.ok_or_else(|| format!("{kind} crosswalk is missing field `{field}`"))
}

impl TryFrom<XwalkRecord> for Xwalk {
    type Error = String;

    fn try_from(r: XwalkRecord) -> Result<Self, Self::Error> {
        let kind = r.kind;
        Ok(match kind {
            CalibrationMethod::Linear => Xwalk::Linear {
                slope: required(r.slope, "slope", kind)?,
                intercept: required(r.intercept, "intercept", kind)?,
                clip: r.clip,
            },
            CalibrationMethod::Piecewise => Xwalk::Piecewise {
                a: required(r.a, "a", kind)?,
                b: required(r.b, "b", kind)?,
                c: required(r.c, "c", kind)?,
                d: required(r.d, "d", kind)?,
                knots: required(r.knots, "knots", kind)?,
                clip: r.clip,
            },
        })
    }
}

impl<'de> Deserialize<'de> for Xwalk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        XwalkRecord::deserialize(deserializer)?.try_into().map_err(de::Error::custom)
    }
}

impl Xwalk {
    pub fn method(&self) -> CalibrationMethod {
        match self {
            Xwalk::Linear { .. } => CalibrationMethod::Linear,
            Xwalk::Piecewise { .. } => CalibrationMethod::Piecewise,
        }
    }

    /// The crosswalk's own clip range, if it overrides the global default.
    pub fn clip(&self) -> Option<ClipRange> {
        match self {
            Xwalk::Linear { clip, .. } | Xwalk::Piecewise { clip, .. } => *clip,
        }
    }
}

/// Which crosswalk family a domain is declared to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationMethod {
    Linear,
    Piecewise,
}

impl fmt::Display for CalibrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationMethod::Linear => f.write_str("linear"),
            CalibrationMethod::Piecewise => f.write_str("piecewise"),
        }
    }
}

/// `calibration.<domain>` entry: method name plus crosswalk file, relative to
/// the model directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationEntry {
    pub method: CalibrationMethod,
    pub file: String,
}

/// Item counts are whole numbers, but model files written by other tools may
/// spell them `4.0`. Accept any finite non-negative integral value.
fn whole_count<E: de::Error>(value: f64) -> Result<u32, E> {
    if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        Ok(value as u32)
    } else {
        Err(E::custom(format!("expected a non-negative whole number, got {value}")))
    }
}

fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    whole_count(f64::deserialize(deserializer)?)
}

fn count_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HashMap<Domain, u32>, D::Error> {
    HashMap::<Domain, f64>::deserialize(deserializer)?
        .into_iter()
        .map(|(domain, value)| whole_count(value).map(|n| (domain, n)))
        .collect()
}

/// Anxiety/depression second-pass rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondPassRule {
    pub enabled: bool,
    pub se_threshold: f64,
    /// Threshold on the T scale.
    pub theta_hi_t: f64,
    pub discordance_trigger: bool,
    #[serde(deserialize_with = "count")]
    pub extra_items: u32,
}

/// Adaptive-testing routing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(deserialize_with = "count")]
    pub gate_items_per_domain: u32,
    #[serde(deserialize_with = "count_map")]
    pub min_items: HashMap<Domain, u32>,
    #[serde(deserialize_with = "count_map")]
    pub max_items: HashMap<Domain, u32>,
    /// Stop-SE threshold per domain, in T-score units.
    pub stop_se_t: HashMap<Domain, f64>,
    pub a_d_second_pass: SecondPassRule,
}

/// Versioned model configuration (`model_config.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub version: String,
    pub domains: Vec<Domain>,
    /// Minimum clinically important difference. Not used in scoring.
    #[serde(default)]
    pub mcid: HashMap<Domain, f64>,
    pub routing: RoutingConfig,
    pub calibration: HashMap<Domain, CalibrationEntry>,
    /// Default clip range for calibrated output.
    pub clip: ClipRange,
}

impl ModelConfig {
    pub fn has_domain(&self, domain: Domain) -> bool {
        self.domains.contains(&domain)
    }
}

/// A fully loaded model: configuration plus one crosswalk per listed domain.
///
/// This is the explicit configuration object handed to every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub config: ModelConfig,
    pub xwalks: HashMap<Domain, Xwalk>,
}

impl Model {
    /// Crosswalk for a domain that is both listed in the config and loaded.
    pub fn xwalk(&self, domain: Domain) -> Option<&Xwalk> {
        if !self.config.has_domain(domain) {
            return None;
        }
        self.xwalks.get(&domain)
    }
}
