/*!
The agency contract and the itinerary value types.

An *agency* is an edge producer: asked for the best connection between
two named nodes around a time anchor, it answers with zero or more
candidate [`Direction`]s, best first. The solver never materializes a
graph; it interrogates agencies lazily through this trait.

Three agencies are in scope, tagged by [`AgencyKind`]:

* [`TransitAgency`]: a timetabled shuttle service;
* [`WalkingStaticAgency`]: pre-baked pedestrian distances between
  known stops;
* [`WalkingDynamicAgency`]: on-demand great-circle walking between
  arbitrary points.
*/

pub mod transit;
pub mod walking_dynamic;
pub mod walking_static;

pub use transit::{RouteSchedule, StopTime, Timetable, TransitAgency, TripSchedule};
pub use walking_dynamic::WalkingDynamicAgency;
pub use walking_static::{WalkPath, WalkingMatrix, WalkingStaticAgency};

use std::fmt;
use std::time::Instant;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Stable tag identifying an edge producer, used for anti-chaining
/// checks and for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgencyKind {
    Transit,
    WalkingStatic,
    WalkingDynamic,
}

impl AgencyKind {
    /// Whether this agency moves the traveler on foot.
    #[must_use]
    pub fn is_walking(self) -> bool {
        matches!(self, AgencyKind::WalkingStatic | AgencyKind::WalkingDynamic)
    }
}

impl fmt::Display for AgencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgencyKind::Transit => "shuttle",
            AgencyKind::WalkingStatic => "walking",
            AgencyKind::WalkingDynamic => "walking",
        };
        f.write_str(label)
    }
}

/// A stop passed through in the middle of one leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntermediateStop {
    pub node: String,
    pub time: NaiveDateTime,
}

/// One directed, time-stamped leg of an itinerary.
///
/// Invariants: `datetime_depart <= datetime_arrive`, and intermediate
/// stops are time-monotonic and lie strictly between the endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub from_node: String,
    pub to_node: String,
    /// Wall-clock time in the deployment's timezone; no offset attached.
    pub datetime_depart: NaiveDateTime,
    pub datetime_arrive: NaiveDateTime,
    pub instruction: String,
    pub intermediate_stops: Vec<IntermediateStop>,
    pub agency: AgencyKind,
}

impl Direction {
    /// Equality as used for duplicate detection across itineraries:
    /// endpoints, times, and agency kind; instructions and intermediate
    /// stops are presentation detail.
    #[must_use]
    pub fn same_leg(&self, other: &Direction) -> bool {
        self.from_node == other.from_node
            && self.to_node == other.to_node
            && self.datetime_depart == other.datetime_depart
            && self.datetime_arrive == other.datetime_arrive
            && self.agency == other.agency
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.instruction,
            self.datetime_depart.format("%H:%M"),
            self.datetime_arrive.format("%H:%M"),
        )
    }
}

/// The time bound an edge query is anchored to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// The traveler is present at the `from` node and may leave at or
    /// after this moment.
    DepartAfter(NaiveDateTime),
    /// The traveler must be at the `to` node at or before this moment.
    ArriveBefore(NaiveDateTime),
}

impl Anchor {
    #[must_use]
    pub fn time(self) -> NaiveDateTime {
        match self {
            Anchor::DepartAfter(t) | Anchor::ArriveBefore(t) => t,
        }
    }

    #[must_use]
    pub fn is_arrival(self) -> bool {
        matches!(self, Anchor::ArriveBefore(_))
    }
}

/// Cap on the duration of a single walking leg.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WalkLimit {
    #[default]
    Unlimited,
    /// Only walking legs of at most this many seconds are produced.
    /// Zero disables walking entirely.
    MaxSeconds(f64),
}

impl WalkLimit {
    #[must_use]
    pub fn disabled() -> Self {
        WalkLimit::MaxSeconds(0.0)
    }

    #[must_use]
    pub fn allows(self, duration_seconds: f64) -> bool {
        match self {
            WalkLimit::Unlimited => true,
            WalkLimit::MaxSeconds(max) => duration_seconds <= max,
        }
    }
}

/// Per-request search state, passed into every agency call.
///
/// Requests running concurrently each carry their own context; nothing
/// here is process-global.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchContext {
    pub walk_limit: WalkLimit,
    /// When set, the solver gives up with [`crate::Error::Cancelled`]
    /// once this instant has passed.
    pub deadline: Option<Instant>,
}

impl SearchContext {
    #[must_use]
    pub fn new(walk_limit: WalkLimit) -> Self {
        SearchContext {
            walk_limit,
            deadline: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A pluggable edge producer.
pub trait Agency {
    /// Stable tag for this producer.
    fn kind(&self) -> AgencyKind;

    /// Called once before each solver run with the raw endpoints, so an
    /// agency may parse non-catalog endpoints (e.g. `"lat,lng"`
    /// strings) into internal geometry. A no-op by default.
    fn use_origin_destination(&mut self, _origin: &str, _destination: &str) {}

    /// Candidate edges from `from` to `to` around `anchor`, best first.
    ///
    /// Edges must respect the anchor bound: `datetime_depart` at or
    /// after a [`Anchor::DepartAfter`] anchor, `datetime_arrive` at or
    /// before an [`Anchor::ArriveBefore`] one. `consecutive` is the
    /// kind of the edge adjacent in the path under construction, and
    /// lets an agency refuse illegal chains (walking twice in a row).
    ///
    /// The sequence is lazy and the caller consumes at most its first
    /// element per invocation. Empty means the pair is unserved or no
    /// feasible edge exists; an agency that hits a transient internal
    /// fault also answers empty rather than failing the search.
    ///
    /// The solver's closed set assumes FIFO behavior: for a fixed node
    /// pair, moving the anchor later (forward) or earlier (reverse)
    /// must never produce a better edge than the original anchor did.
    /// Timetabled services satisfy this naturally.
    fn edges_between<'a>(
        &'a self,
        from: &str,
        to: &str,
        anchor: Anchor,
        consecutive: Option<AgencyKind>,
        ctx: &SearchContext,
    ) -> Box<dyn Iterator<Item = Direction> + 'a>;
}
