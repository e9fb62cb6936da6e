/*!
# Headway core

**Headway** computes door-to-door, time-aware travel itineraries over a
heterogeneous transportation network. There is no pre-materialized
graph: nodes are plain strings (stop names from a catalog, or free-form
endpoints supplied by the caller) and edges are produced on demand by a
pluggable set of *agencies*: a timetabled shuttle agency, a static
walking agency backed by pre-baked distances, and a dynamic walking
agency that measures great-circle distance between arbitrary points.

The solver runs a time-dependent uniform-cost search over that virtual
graph, in either direction:

* *depart after T*: earliest arrival, then fewest legs, then latest
  feasible departure;
* *arrive before T*: latest departure, then fewest legs, then earliest
  arrival.

On top of the single-path solver sit a multi-itinerary variator (up to
*k* distinct alternatives, produced by selectively disabling agencies)
and a departure lister (the next *N* departures out of one node).

# Example
```ignore
use headway_core::prelude::*;

let catalog = StopsCatalog::from_csv("data/stops.csv")?;
let mut agencies: Vec<Box<dyn Agency>> = vec![
    Box::new(TransitAgency::load("data/shuttle_timetable.bin")?),
    Box::new(WalkingStaticAgency::load("data/walking_distances.bin")?),
];

let ctx = SearchContext::new(WalkLimit::MaxSeconds(900.0));
let itinerary = find_itinerary(
    &mut agencies,
    &catalog,
    "Library",
    "Stadium",
    departure_time,
    true,
    &ctx,
)?;
```
*/

use thiserror::Error;

pub mod agency;
pub mod algo;
pub mod connectors;
pub mod geometry;
pub mod prelude;
pub mod stops;

/// Average pedestrian speed in metres per second.
pub const WALK_SPEED: f64 = 1.39;

/// Error type shared across the crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "no itinerary is possible: there is no continuous path between the \
         endpoints, or no agency recognized the origin or destination"
    )]
    ItineraryNotPossible,
    #[error("the search was cancelled before it completed")]
    Cancelled,
    #[error("malformed edge token: {0:?}")]
    MalformedEdgeToken(String),
    #[error("agency data unavailable: {0}")]
    AgencyUnavailable(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] polars::error::PolarsError),
    #[error("binary codec error: {0}")]
    Codec(#[from] bincode::Error),
}
