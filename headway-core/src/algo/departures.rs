//! The departure lister: the next *N* outbound edges from one node,
//! ordered by departure time.

use chrono::{Duration, NaiveDateTime};
use hashbrown::HashSet;

use crate::agency::{Agency, AgencyKind, Anchor, Direction, SearchContext};
use crate::connectors::weighted_edges;
use crate::stops::StopsCatalog;
use crate::Error;

/// Lists up to `count` departures out of `origin`, earliest first,
/// all at or after `trip_datetime`.
///
/// Each round collects every agency's soonest edge out of `origin`,
/// emits the earliest by `(departure, arrival, destination)`, and
/// advances the anchor to one second past that departure, so emitted
/// departures are strictly increasing and none in between are skipped.
/// Destinations may repeat; the same vehicle reported twice is dropped
/// by its `(from, to, departure, agency)` tuple.
pub fn departure_list(
    agencies: &mut [Box<dyn Agency>],
    catalog: &StopsCatalog,
    origin: &str,
    trip_datetime: NaiveDateTime,
    count: usize,
    ctx: &SearchContext,
) -> Result<Vec<Direction>, Error> {
    let origin = origin.trim();
    for agency in agencies.iter_mut() {
        agency.use_origin_destination(origin, origin);
    }
    let enabled: Vec<&dyn Agency> = agencies.iter().map(|agency| agency.as_ref()).collect();

    let extra_nodes = [origin];
    let mut seen: HashSet<(String, String, NaiveDateTime, AgencyKind)> = HashSet::new();
    let mut departures: Vec<Direction> = Vec::new();
    let mut anchor_time = trip_datetime;

    while departures.len() < count {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let mut batch: Vec<Direction> = weighted_edges(
            &enabled,
            catalog,
            origin,
            Anchor::DepartAfter(anchor_time),
            None,
            &extra_nodes,
            ctx,
        )
        .collect();
        batch.sort_by(|a, b| {
            a.datetime_depart
                .cmp(&b.datetime_depart)
                .then_with(|| a.datetime_arrive.cmp(&b.datetime_arrive))
                .then_with(|| a.to_node.cmp(&b.to_node))
        });

        let mut emitted = false;
        for edge in batch {
            let key = (
                edge.from_node.clone(),
                edge.to_node.clone(),
                edge.datetime_depart,
                edge.agency,
            );
            if seen.insert(key) {
                anchor_time = edge.datetime_depart + Duration::seconds(1);
                departures.push(edge);
                emitted = true;
                break;
            }
        }
        if !emitted {
            break;
        }
    }
    Ok(departures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agency::{RouteSchedule, StopTime, Timetable, TransitAgency, TripSchedule};
    use chrono::{NaiveDate, NaiveTime};

    fn dt(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
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

    fn catalog() -> StopsCatalog {
        StopsCatalog::from_records([
            ("Library".to_string(), 40.7295, -73.9965),
            ("Gym".to_string(), 40.7310, -73.9950),
        ])
        .unwrap()
    }

    fn agencies() -> Vec<Box<dyn Agency>> {
        let transit = TransitAgency::new(Timetable {
            routes: vec![RouteSchedule {
                name: "Campus Loop".to_string(),
                trips: vec![
                    trip(&[("Library", t(9, 0)), ("Gym", t(9, 12))]),
                    trip(&[("Library", t(9, 5)), ("Gym", t(9, 17))]),
                    trip(&[("Library", t(9, 10)), ("Gym", t(9, 22))]),
                    trip(&[("Library", t(9, 30)), ("Gym", t(9, 42))]),
                ],
            }],
        });
        vec![Box::new(transit)]
    }

    #[test]
    fn lists_departures_after_the_anchor_in_order() {
        let departures = departure_list(
            &mut agencies(),
            &catalog(),
            "Library",
            dt(9, 2),
            3,
            &SearchContext::default(),
        )
        .unwrap();
        let times: Vec<NaiveDateTime> = departures.iter().map(|d| d.datetime_depart).collect();
        assert_eq!(times, [dt(9, 5), dt(9, 10), dt(9, 30)]);
        assert!(departures.iter().all(|d| d.datetime_depart >= dt(9, 2)));
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn count_exceeding_service_returns_what_exists() {
        let departures = departure_list(
            &mut agencies(),
            &catalog(),
            "Library",
            dt(9, 2),
            10,
            &SearchContext::default(),
        )
        .unwrap();
        assert_eq!(departures.len(), 3);
    }

    #[test]
    fn unknown_origin_lists_nothing() {
        let departures = departure_list(
            &mut agencies(),
            &catalog(),
            "Nowhere",
            dt(9, 0),
            3,
            &SearchContext::default(),
        )
        .unwrap();
        assert!(departures.is_empty());
    }

    #[test]
    fn destinations_may_repeat() {
        let departures = departure_list(
            &mut agencies(),
            &catalog(),
            "Library",
            dt(8, 0),
            4,
            &SearchContext::default(),
        )
        .unwrap();
        assert_eq!(departures.len(), 4);
        assert!(departures.iter().all(|d| d.to_node == "Gym"));
    }
}
