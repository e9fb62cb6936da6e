//! The multi-itinerary variator: produces alternative itineraries by
//! re-running the solver with individual agencies disabled.

use chrono::NaiveDateTime;
use log::debug;

use super::itinerary::solve;
use crate::agency::{Agency, AgencyKind, Direction, SearchContext};
use crate::stops::StopsCatalog;
use crate::Error;

/// Finds up to `max_count` distinct itineraries.
///
/// The first itinerary is exactly what [`super::find_itinerary`] would
/// return over the full agency set. Each further candidate comes from
/// re-solving with one agency from `agencies_to_vary` disabled, taken
/// in order, for every varied agency that contributed a leg to the
/// first itinerary. Candidates that duplicate an already-collected
/// itinerary (leg-by-leg, per [`Direction::same_leg`]) are dropped.
///
/// An impossible baseline yields an empty list rather than an error;
/// only cancellation propagates.
#[allow(clippy::too_many_arguments)]
pub fn find_itineraries(
    agencies_to_vary: &[AgencyKind],
    agencies: &mut [Box<dyn Agency>],
    catalog: &StopsCatalog,
    origin: &str,
    destination: &str,
    trip_datetime: NaiveDateTime,
    depart: bool,
    max_count: usize,
    ctx: &SearchContext,
) -> Result<Vec<Vec<Direction>>, Error> {
    if max_count == 0 {
        return Ok(Vec::new());
    }
    let origin = origin.trim();
    let destination = destination.trim();
    for agency in agencies.iter_mut() {
        agency.use_origin_destination(origin, destination);
    }

    let all: Vec<&dyn Agency> = agencies.iter().map(|agency| agency.as_ref()).collect();
    let first = match solve(&all, catalog, origin, destination, trip_datetime, depart, ctx) {
        Ok(itinerary) => itinerary,
        Err(Error::ItineraryNotPossible) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut itineraries = vec![first];

    for kind in agencies_to_vary {
        if itineraries.len() >= max_count {
            break;
        }
        // Disabling an agency that contributed nothing reproduces the
        // baseline, so only agencies present in it are varied.
        if !itineraries[0].iter().any(|leg| leg.agency == *kind) {
            continue;
        }
        let subset: Vec<&dyn Agency> = agencies
            .iter()
            .filter(|agency| agency.kind() != *kind)
            .map(|agency| agency.as_ref())
            .collect();
        match solve(&subset, catalog, origin, destination, trip_datetime, depart, ctx) {
            Ok(candidate) => {
                if candidate.is_empty()
                    || itineraries
                        .iter()
                        .any(|known| same_itinerary(known, &candidate))
                {
                    debug!("variator: dropping duplicate with {kind:?} disabled");
                } else {
                    itineraries.push(candidate);
                }
            }
            Err(Error::ItineraryNotPossible) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(itineraries)
}

fn same_itinerary(a: &[Direction], b: &[Direction]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_leg(y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agency::{
        RouteSchedule, StopTime, Timetable, TransitAgency, TripSchedule, WalkPath, WalkingMatrix,
        WalkingStaticAgency,
    };
    use crate::algo::find_itinerary;
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

    fn catalog() -> StopsCatalog {
        StopsCatalog::from_records([
            ("Library".to_string(), 40.7295, -73.9965),
            ("Gym".to_string(), 40.7310, -73.9950),
        ])
        .unwrap()
    }

    /// A shuttle (waits until 9:05, arrives 9:15) and a direct walk
    /// (leaves at once, arrives 9:15 + 15 = 9:30).
    fn agencies() -> Vec<Box<dyn Agency>> {
        let transit = TransitAgency::new(Timetable {
            routes: vec![RouteSchedule {
                name: "Campus Loop".to_string(),
                trips: vec![TripSchedule {
                    stops: vec![
                        StopTime {
                            stop: "Library".to_string(),
                            time: t(9, 5),
                        },
                        StopTime {
                            stop: "Gym".to_string(),
                            time: t(9, 15),
                        },
                    ],
                }],
            }],
        });
        let walking = WalkingStaticAgency::new(WalkingMatrix {
            paths: vec![WalkPath {
                from: "Library".to_string(),
                to: "Gym".to_string(),
                meters: 1800.0 * crate::WALK_SPEED,
            }],
        });
        vec![Box::new(transit), Box::new(walking)]
    }

    const VARY: [AgencyKind; 3] = [
        AgencyKind::Transit,
        AgencyKind::WalkingStatic,
        AgencyKind::WalkingDynamic,
    ];

    #[test]
    fn returns_distinct_alternatives_in_order() {
        let itineraries = find_itineraries(
            &VARY,
            &mut agencies(),
            &catalog(),
            "Library",
            "Gym",
            dt(9, 0),
            true,
            3,
            &SearchContext::default(),
        )
        .unwrap();

        // Transit first (earlier arrival), then the walk; nothing else
        // is feasible.
        assert_eq!(itineraries.len(), 2);
        assert_eq!(itineraries[0][0].agency, AgencyKind::Transit);
        assert_eq!(itineraries[1][0].agency, AgencyKind::WalkingStatic);
        for pair in itineraries.windows(2) {
            assert!(!same_itinerary(&pair[0], &pair[1]));
        }
    }

    #[test]
    fn first_matches_single_itinerary_solver() {
        let itineraries = find_itineraries(
            &VARY,
            &mut agencies(),
            &catalog(),
            "Library",
            "Gym",
            dt(9, 0),
            true,
            3,
            &SearchContext::default(),
        )
        .unwrap();
        let single = find_itinerary(
            &mut agencies(),
            &catalog(),
            "Library",
            "Gym",
            dt(9, 0),
            true,
            &SearchContext::default(),
        )
        .unwrap();
        assert!(same_itinerary(&itineraries[0], &single));
    }

    #[test]
    fn max_count_caps_the_output() {
        let itineraries = find_itineraries(
            &VARY,
            &mut agencies(),
            &catalog(),
            "Library",
            "Gym",
            dt(9, 0),
            true,
            1,
            &SearchContext::default(),
        )
        .unwrap();
        assert_eq!(itineraries.len(), 1);

        let none = find_itineraries(
            &VARY,
            &mut agencies(),
            &catalog(),
            "Library",
            "Gym",
            dt(9, 0),
            true,
            0,
            &SearchContext::default(),
        )
        .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn impossible_baseline_yields_empty_list() {
        let itineraries = find_itineraries(
            &VARY,
            &mut agencies(),
            &catalog(),
            "Nowhere",
            "Gym",
            dt(9, 0),
            true,
            3,
            &SearchContext::default(),
        )
        .unwrap();
        assert!(itineraries.is_empty());
    }

    #[test]
    fn unvaried_agencies_are_kept() {
        // Varying only transit replaces the baseline's one transit leg
        // with the walking alternative.
        let itineraries = find_itineraries(
            &[AgencyKind::Transit],
            &mut agencies(),
            &catalog(),
            "Library",
            "Gym",
            dt(9, 0),
            true,
            3,
            &SearchContext::default(),
        )
        .unwrap();
        assert_eq!(itineraries.len(), 2);

        let itineraries = find_itineraries(
            &[AgencyKind::WalkingDynamic],
            &mut agencies(),
            &catalog(),
            "Library",
            "Gym",
            dt(9, 0),
            true,
            3,
            &SearchContext::default(),
        )
        .unwrap();
        // The baseline has no dynamic-walking leg, so nothing varies.
        assert_eq!(itineraries.len(), 1);
    }
}
