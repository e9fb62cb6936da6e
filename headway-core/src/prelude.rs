//! Convenient re-exports of the crate's public surface.

pub use crate::agency::{
    Agency, AgencyKind, Anchor, Direction, IntermediateStop, RouteSchedule, SearchContext,
    StopTime, Timetable, TransitAgency, TripSchedule, WalkLimit, WalkPath, WalkingDynamicAgency,
    WalkingMatrix, WalkingStaticAgency,
};
pub use crate::algo::{departure_list, find_itineraries, find_itinerary};
pub use crate::connectors::weighted_edges;
pub use crate::geometry::Edge;
pub use crate::stops::StopsCatalog;
pub use crate::{Error, WALK_SPEED};
