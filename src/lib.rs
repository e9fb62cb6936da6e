/*!
# Headway

**Headway** plans door-to-door, time-aware travel itineraries over a
heterogeneous transportation network: a timetabled shuttle service plus
static and dynamic walking, stitched together by a time-dependent
uniform-cost search. The engine lives in [`headway_core`]; this crate
is the request-boundary facade a front-end talks to: it assembles the
agency set from on-disk data, maps raw query values onto per-request
search state, and exposes the planning entry points.

# Example
```ignore
use headway::{Planner, TripQuery, WalkingMax};

let mut planner = Planner::load("data".as_ref())?;
let query = TripQuery::new("Library", "Stadium", departure_time)
    .with_walking_max(WalkingMax::Custom(10.0));
for itinerary in planner.plan(&query)? {
    for direction in itinerary {
        println!("{direction}");
    }
}
```
*/

pub mod request;

pub use headway_core::prelude::*;
pub use request::{TripQuery, WalkingMax};

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use log::{info, warn};

/// File names `Planner::load` looks for in its data directory.
const STOPS_CSV: &str = "stops.csv";
const TIMETABLE_BIN: &str = "shuttle_timetable.bin";
const WALKING_BIN: &str = "walking_distances.bin";

/// Agency kinds the variator may disable when producing alternatives.
const VARIED_AGENCIES: [AgencyKind; 3] = [
    AgencyKind::Transit,
    AgencyKind::WalkingStatic,
    AgencyKind::WalkingDynamic,
];

/// Owns the stops catalog and the enabled agency set, and runs
/// queries against them. One planner serves one worker; concurrent
/// workers each load their own (the catalog itself is shared
/// read-only behind an `Arc`).
pub struct Planner {
    catalog: Arc<StopsCatalog>,
    agencies: Vec<Box<dyn Agency>>,
    deadline: Option<Duration>,
}

impl Planner {
    #[must_use]
    pub fn new(catalog: Arc<StopsCatalog>, agencies: Vec<Box<dyn Agency>>) -> Self {
        Planner {
            catalog,
            agencies,
            deadline: None,
        }
    }

    /// Loads the catalog and every agency whose backing data is
    /// present in `data_dir`.
    ///
    /// A missing stops catalog is fatal. An unavailable agency is
    /// logged and excluded from the enabled set; it never fails a
    /// request later.
    pub fn load(data_dir: &Path) -> Result<Self, Error> {
        let catalog = Arc::new(StopsCatalog::from_csv(data_dir.join(STOPS_CSV))?);
        let mut agencies: Vec<Box<dyn Agency>> = Vec::new();
        match TransitAgency::load(data_dir.join(TIMETABLE_BIN)) {
            Ok(agency) => agencies.push(Box::new(agency)),
            Err(e) => warn!("shuttle agency excluded: {e}"),
        }
        match WalkingStaticAgency::load(data_dir.join(WALKING_BIN)) {
            Ok(agency) => agencies.push(Box::new(agency)),
            Err(e) => warn!("static walking agency excluded: {e}"),
        }
        agencies.push(Box::new(WalkingDynamicAgency::new(Arc::clone(&catalog))));
        info!(
            "planner ready: {} stops, {} agencies",
            catalog.len(),
            agencies.len()
        );
        Ok(Planner::new(catalog, agencies))
    }

    /// Gives every request started from now on this much time to
    /// finish before the solver reports [`Error::Cancelled`].
    pub fn set_request_timeout(&mut self, timeout: Option<Duration>) {
        self.deadline = timeout;
    }

    #[must_use]
    pub fn catalog(&self) -> &StopsCatalog {
        &self.catalog
    }

    /// Stop names for endpoint pickers, sorted case-insensitively.
    #[must_use]
    pub fn stop_names(&self) -> &[String] {
        self.catalog.names()
    }

    fn context(&self, walking_max: WalkingMax) -> SearchContext {
        let ctx = SearchContext::new(walking_max.to_limit());
        match self.deadline {
            Some(timeout) => ctx.with_deadline(Instant::now() + timeout),
            None => ctx,
        }
    }

    /// The single best itinerary for `query`.
    ///
    /// # Errors
    /// [`Error::ItineraryNotPossible`] when no path exists,
    /// [`Error::Cancelled`] on timeout.
    pub fn route(&mut self, query: &TripQuery) -> Result<Vec<Direction>, Error> {
        let ctx = self.context(query.walking_max);
        find_itinerary(
            &mut self.agencies,
            &self.catalog,
            &query.origin,
            &query.destination,
            query.when,
            query.depart,
            &ctx,
        )
    }

    /// Up to `query.max_itineraries` distinct itineraries, best first;
    /// empty when no path exists at all.
    pub fn plan(&mut self, query: &TripQuery) -> Result<Vec<Vec<Direction>>, Error> {
        let ctx = self.context(query.walking_max);
        find_itineraries(
            &VARIED_AGENCIES,
            &mut self.agencies,
            &self.catalog,
            &query.origin,
            &query.destination,
            query.when,
            query.depart,
            query.max_itineraries,
            &ctx,
        )
    }

    /// The next `count` departures out of `origin` at or after `when`.
    ///
    /// Walking legs depart whenever the traveler does, so the board
    /// lists scheduled service only.
    pub fn departures(
        &mut self,
        origin: &str,
        when: NaiveDateTime,
        count: usize,
    ) -> Result<Vec<Direction>, Error> {
        let ctx = self.context(WalkingMax::Zero);
        departure_list(
            &mut self.agencies,
            &self.catalog,
            origin,
            when,
            count,
            &ctx,
        )
    }
}
