//! Request-boundary types: the raw query values a front-end collects,
//! mapped onto the core's per-request search state.

use chrono::NaiveDateTime;
use headway_core::prelude::WalkLimit;

/// Fallback for the custom walking cap, in minutes.
const DEFAULT_CUSTOM_MINUTES: f64 = 5.0;

/// The walking cap as the request form expresses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WalkingMax {
    Unlimited,
    /// Walking disabled.
    Zero,
    /// At most this many minutes per walking leg.
    Custom(f64),
}

impl WalkingMax {
    /// Maps the raw `walking-max` / `walking-max-custom` query values.
    /// Unrecognized modes fall back to unlimited, a missing or
    /// unparseable custom value to five minutes.
    #[must_use]
    pub fn parse(mode: Option<&str>, custom_minutes: Option<f64>) -> Self {
        match mode {
            Some("custom") => {
                WalkingMax::Custom(custom_minutes.unwrap_or(DEFAULT_CUSTOM_MINUTES))
            }
            Some("zero") => WalkingMax::Zero,
            _ => WalkingMax::Unlimited,
        }
    }

    #[must_use]
    pub fn to_limit(self) -> WalkLimit {
        match self {
            WalkingMax::Unlimited => WalkLimit::Unlimited,
            WalkingMax::Zero => WalkLimit::disabled(),
            WalkingMax::Custom(minutes) => WalkLimit::MaxSeconds(minutes * 60.0),
        }
    }
}

impl Default for WalkingMax {
    fn default() -> Self {
        WalkingMax::Unlimited
    }
}

/// One trip request, as the front-end hands it over.
#[derive(Debug, Clone, PartialEq)]
pub struct TripQuery {
    pub origin: String,
    pub destination: String,
    /// Naive wall-clock time in the deployment's timezone.
    pub when: NaiveDateTime,
    /// `true` plans "depart after `when`", `false` "arrive before".
    pub depart: bool,
    pub walking_max: WalkingMax,
    pub max_itineraries: usize,
}

impl TripQuery {
    #[must_use]
    pub fn new(origin: &str, destination: &str, when: NaiveDateTime) -> Self {
        TripQuery {
            origin: origin.trim().to_string(),
            destination: destination.trim().to_string(),
            when,
            depart: true,
            walking_max: WalkingMax::default(),
            max_itineraries: 3,
        }
    }

    #[must_use]
    pub fn arrive_by(mut self) -> Self {
        self.depart = false;
        self
    }

    #[must_use]
    pub fn with_walking_max(mut self, walking_max: WalkingMax) -> Self {
        self.walking_max = walking_max;
        self
    }
}
