use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque workout identifier. Ten decimal digits derived from the creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn from_millis(ms: i64) -> Self {
        Self(format!("{:010}", ms.rem_euclid(10_000_000_000)))
    }

    /// Next candidate after a collision, wrapping inside the ten-digit space.
    pub(crate) fn successor(&self) -> Self {
        let n = self.0.parse::<i64>().unwrap_or(0);
        Self::from_millis(n + 1)
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Running,
    Cycling,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latitude/longitude in degrees. Persisted as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn validate(&self) -> Result<()> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "coordinates [{}, {}] out of range",
                self.lat, self.lng
            )))
        }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `LAT,LNG`.
impl FromStr for Coordinates {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::Validation(format!("expected LAT,LNG, got {s:?}"));
        let (lat, lng) = s.split_once(',').ok_or_else(bad)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| bad())?;
        let lng = lng.trim().parse::<f64>().map_err(|_| bad())?;
        let c = Self { lat, lng };
        c.validate()?;
        Ok(c)
    }
}

/// Variant-specific measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
}

impl Activity {
    /// Builds the variant for `kind` from the form's cadence-or-elevation value.
    pub const fn new(kind: Kind, extra: f64) -> Self {
        match kind {
            Kind::Running => Self::Running { cadence: extra },
            Kind::Cycling => Self::Cycling {
                elevation_gain: extra,
            },
        }
    }

    pub const fn kind(&self) -> Kind {
        match self {
            Self::Running { .. } => Kind::Running,
            Self::Cycling { .. } => Kind::Cycling,
        }
    }

    /// Cadence for running, elevation gain for cycling.
    pub const fn extra(&self) -> f64 {
        match *self {
            Self::Running { cadence } => cadence,
            Self::Cycling { elevation_gain } => elevation_gain,
        }
    }
}

/// One logged activity. Only the store mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub(crate) id: WorkoutId,
    pub(crate) coordinates: Coordinates,
    pub(crate) distance: f64,
    pub(crate) duration: f64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) activity: Activity,
}

impl Workout {
    pub const fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub const fn kind(&self) -> Kind {
        self.activity.kind()
    }

    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Kilometers.
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    /// Minutes.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn activity(&self) -> Activity {
        self.activity
    }

    pub const fn cadence(&self) -> Option<f64> {
        match self.activity {
            Activity::Running { cadence } => Some(cadence),
            Activity::Cycling { .. } => None,
        }
    }

    pub const fn elevation_gain(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { elevation_gain } => Some(elevation_gain),
            Activity::Running { .. } => None,
        }
    }

    /// min/km, running only.
    pub fn pace(&self) -> Option<f64> {
        matches!(self.activity, Activity::Running { .. })
            .then(|| pace(self.distance, self.duration))
    }

    /// km/h, cycling only.
    pub fn speed(&self) -> Option<f64> {
        matches!(self.activity, Activity::Cycling { .. })
            .then(|| speed(self.distance, self.duration))
    }

    pub fn description(&self) -> String {
        describe(self.kind(), self.created_at)
    }
}

pub fn pace(distance: f64, duration: f64) -> f64 {
    duration / distance
}

pub fn speed(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

/// `"Running on October 19"`, using the local calendar date.
pub fn describe(kind: Kind, created_at: DateTime<Utc>) -> String {
    let local = created_at.with_timezone(&Local);
    format!("{} on {} {}", kind.title(), local.format("%B"), local.day())
}

/// Checks the measured fields of a create/update request.
pub fn validate_measurements(distance: f64, duration: f64, activity: Activity) -> Result<()> {
    let positive = |name: &str, v: f64| {
        if v.is_finite() && v > 0.0 {
            Ok(())
        } else {
            Err(Error::Validation(format!("{name} = {v}")))
        }
    };

    positive("distance", distance)?;
    positive("duration", duration)?;
    match activity {
        Activity::Running { cadence } => positive("cadence", cadence),
        Activity::Cycling { elevation_gain } if !elevation_gain.is_finite() => Err(
            Error::Validation(format!("elevation gain = {elevation_gain}")),
        ),
        Activity::Cycling { .. } => Ok(()),
    }
}
