//! The timetabled shuttle agency.
//!
//! Its backing data is a daily timetable: named routes, each a list of
//! trips, each trip an ordered sequence of `(stop, time)` pairs. The
//! timetable is pre-baked by an external pipeline and shipped as a
//! bincode blob; this module only reads it.

use std::cmp::Reverse;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::info;
use serde::{Deserialize, Serialize};

use super::{Agency, AgencyKind, Anchor, Direction, IntermediateStop, SearchContext};
use crate::Error;

/// Scheduled call of a trip at one stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTime {
    pub stop: String,
    pub time: NaiveTime,
}

/// One vehicle run along a route, in stop order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSchedule {
    pub stops: Vec<StopTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSchedule {
    pub name: String,
    pub trips: Vec<TripSchedule>,
}

/// The complete daily timetable of the shuttle service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub routes: Vec<RouteSchedule>,
}

impl Timetable {
    /// Reads a timetable blob.
    ///
    /// # Errors
    /// [`Error::AgencyUnavailable`] when the file is missing or does
    /// not decode; per the error policy this is fatal at startup only,
    /// never per-request.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::AgencyUnavailable(format!("timetable {}: {e}", path.display()))
        })?;
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
            Error::AgencyUnavailable(format!("timetable {}: {e}", path.display()))
        })
    }

    /// Writes a timetable blob, the format [`Timetable::load`] reads.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        Ok(bincode::serialize_into(writer, self)?)
    }
}

pub struct TransitAgency {
    timetable: Timetable,
}

impl TransitAgency {
    #[must_use]
    pub fn new(timetable: Timetable) -> Self {
        TransitAgency { timetable }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let timetable = Timetable::load(path)?;
        info!(
            "shuttle timetable loaded: {} routes, {} trips",
            timetable.routes.len(),
            timetable.routes.iter().map(|r| r.trips.len()).sum::<usize>(),
        );
        Ok(Self::new(timetable))
    }

    /// All feasible single-trip connections from `from` to `to` around
    /// the anchor, materialized on the anchor's date.
    fn candidates(&self, from: &str, to: &str, anchor: Anchor) -> Vec<Direction> {
        let date = anchor.time().date();
        let mut out = Vec::new();
        for route in &self.timetable.routes {
            for trip in &route.trips {
                let Some(board) = trip.stops.iter().position(|s| s.stop == from) else {
                    continue;
                };
                let Some(alight) = trip.stops.iter().position(|s| s.stop == to) else {
                    continue;
                };
                if board >= alight {
                    continue;
                }
                let calls = &trip.stops[board..=alight];
                let times = materialize(date, calls);
                let depart = times[0];
                let arrive = times[times.len() - 1];
                match anchor {
                    Anchor::DepartAfter(t) if depart < t => continue,
                    Anchor::ArriveBefore(t) if arrive > t => continue,
                    _ => {}
                }
                let intermediate_stops = calls[1..calls.len() - 1]
                    .iter()
                    .zip(&times[1..times.len() - 1])
                    .map(|(call, time)| IntermediateStop {
                        node: call.stop.clone(),
                        time: *time,
                    })
                    .collect();
                out.push(Direction {
                    from_node: from.to_string(),
                    to_node: to.to_string(),
                    datetime_depart: depart,
                    datetime_arrive: arrive,
                    instruction: format!("Ride {} from {from} to {to}", route.name),
                    intermediate_stops,
                    agency: AgencyKind::Transit,
                });
            }
        }
        out
    }
}

/// Turns trip call times into datetimes on `date`, rolling past
/// midnight whenever a call time runs backwards.
fn materialize(date: NaiveDate, calls: &[StopTime]) -> Vec<NaiveDateTime> {
    let mut times = Vec::with_capacity(calls.len());
    let mut days = 0i64;
    for (idx, call) in calls.iter().enumerate() {
        if idx > 0 && call.time < calls[idx - 1].time {
            days += 1;
        }
        times.push(date.and_time(call.time) + Duration::days(days));
    }
    times
}

impl Agency for TransitAgency {
    fn kind(&self) -> AgencyKind {
        AgencyKind::Transit
    }

    // A shuttle leg may follow any kind of edge, so `consecutive` is
    // irrelevant here.
    fn edges_between<'a>(
        &'a self,
        from: &str,
        to: &str,
        anchor: Anchor,
        _consecutive: Option<AgencyKind>,
        _ctx: &SearchContext,
    ) -> Box<dyn Iterator<Item = Direction> + 'a> {
        let candidates = self.candidates(from, to, anchor);
        let best = if anchor.is_arrival() {
            candidates
                .into_iter()
                .min_by_key(|d| (Reverse(d.datetime_depart), d.datetime_arrive))
        } else {
            candidates
                .into_iter()
                .min_by_key(|d| (d.datetime_arrive, Reverse(d.datetime_depart)))
        };
        Box::new(best.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn trip(calls: &[(&str, NaiveTime)]) -> TripSchedule {
        TripSchedule {
            stops: calls
                .iter()
                .map(|(stop, time)| StopTime {
                    stop: (*stop).to_string(),
                    time: *time,
                })
                .collect(),
        }
    }

    fn agency() -> TransitAgency {
        TransitAgency::new(Timetable {
            routes: vec![RouteSchedule {
                name: "Campus Loop".to_string(),
                trips: vec![
                    trip(&[
                        ("Library", t(9, 0)),
                        ("Dorms", t(9, 10)),
                        ("Gym", t(9, 20)),
                    ]),
                    trip(&[
                        ("Library", t(9, 30)),
                        ("Dorms", t(9, 40)),
                        ("Gym", t(9, 50)),
                    ]),
                ],
            }],
        })
    }

    fn first(
        agency: &TransitAgency,
        from: &str,
        to: &str,
        anchor: Anchor,
    ) -> Option<Direction> {
        agency
            .edges_between(from, to, anchor, None, &SearchContext::default())
            .next()
    }

    #[test]
    fn forward_picks_first_feasible_departure() {
        let edge = first(&agency(), "Library", "Gym", Anchor::DepartAfter(dt(8, 45))).unwrap();
        assert_eq!(edge.datetime_depart, dt(9, 0));
        assert_eq!(edge.datetime_arrive, dt(9, 20));
        assert_eq!(edge.agency, AgencyKind::Transit);
    }

    #[test]
    fn forward_skips_missed_departures() {
        let edge = first(&agency(), "Library", "Gym", Anchor::DepartAfter(dt(9, 5))).unwrap();
        assert_eq!(edge.datetime_depart, dt(9, 30));
    }

    #[test]
    fn reverse_picks_latest_feasible_departure() {
        let edge = first(&agency(), "Library", "Gym", Anchor::ArriveBefore(dt(9, 55))).unwrap();
        assert_eq!(edge.datetime_depart, dt(9, 30));
        assert_eq!(edge.datetime_arrive, dt(9, 50));

        let edge = first(&agency(), "Library", "Gym", Anchor::ArriveBefore(dt(9, 25))).unwrap();
        assert_eq!(edge.datetime_depart, dt(9, 0));
    }

    #[test]
    fn intermediate_stops_lie_strictly_between_endpoints() {
        let edge = first(&agency(), "Library", "Gym", Anchor::DepartAfter(dt(8, 0))).unwrap();
        assert_eq!(edge.intermediate_stops.len(), 1);
        let stop = &edge.intermediate_stops[0];
        assert_eq!(stop.node, "Dorms");
        assert!(stop.time > edge.datetime_depart && stop.time < edge.datetime_arrive);

        // Adjacent stops have no intermediates.
        let edge = first(&agency(), "Library", "Dorms", Anchor::DepartAfter(dt(8, 0))).unwrap();
        assert!(edge.intermediate_stops.is_empty());
    }

    #[test]
    fn direction_of_travel_is_respected() {
        assert!(first(&agency(), "Gym", "Library", Anchor::DepartAfter(dt(8, 0))).is_none());
    }

    #[test]
    fn no_service_after_last_trip() {
        assert!(first(&agency(), "Library", "Gym", Anchor::DepartAfter(dt(10, 0))).is_none());
    }

    #[test]
    fn overnight_trip_rolls_past_midnight() {
        let night = TransitAgency::new(Timetable {
            routes: vec![RouteSchedule {
                name: "Owl".to_string(),
                trips: vec![trip(&[("Library", t(23, 50)), ("Gym", t(0, 10))])],
            }],
        });
        let edge = first(&night, "Library", "Gym", Anchor::DepartAfter(dt(23, 0))).unwrap();
        assert_eq!(edge.datetime_depart, dt(23, 50));
        assert_eq!(
            edge.datetime_arrive,
            NaiveDate::from_ymd_opt(2024, 5, 7)
                .unwrap()
                .and_hms_opt(0, 10, 0)
                .unwrap()
        );
    }

    #[test]
    fn timetable_round_trips_through_blob() {
        let path = std::env::temp_dir().join(format!("headway-timetable-{}.bin", std::process::id()));
        let timetable = agency().timetable;
        timetable.save(&path).unwrap();
        let loaded = Timetable::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, timetable);
    }

    #[test]
    fn missing_blob_is_unavailable() {
        let result = TransitAgency::load("/nonexistent/timetable.bin");
        assert!(matches!(result, Err(Error::AgencyUnavailable(_))));
    }
}
