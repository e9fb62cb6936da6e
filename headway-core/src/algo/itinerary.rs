//! The itinerary solver: a time-dependent uniform-cost search over the
//! virtual graph whose edges the agencies produce on demand.
//!
//! The cost of reaching a node is the lexicographic triple described on
//! [`find_itinerary`]; the frontier is a binary min-heap of those
//! triples and a node becomes closed on first pop. Agencies are
//! re-queried at every expansion with the anchor time of the popped
//! node, which is what makes the search time-dependent.

use std::collections::BinaryHeap;

use chrono::NaiveDateTime;
use hashbrown::{HashMap, HashSet};
use log::debug;

use super::MinScored;
use crate::agency::{Agency, AgencyKind, Anchor, Direction, IntermediateStop, SearchContext};
use crate::connectors::weighted_edges;
use crate::stops::StopsCatalog;
use crate::Error;

/// The best way found so far to reach one node: the chosen incoming
/// edge (outgoing, in reverse search) plus the accumulated leg count.
struct PreviousNode {
    agency: Option<AgencyKind>,
    arrival_time: NaiveDateTime,
    departure_time: NaiveDateTime,
    instruction: Option<String>,
    intermediate_stops: Vec<IntermediateStop>,
    prev_name: Option<String>,
    num_stops_to_node: u32,
}

impl Default for PreviousNode {
    fn default() -> Self {
        PreviousNode {
            agency: None,
            arrival_time: NaiveDateTime::MAX,
            departure_time: NaiveDateTime::MIN,
            instruction: None,
            intermediate_stops: Vec::new(),
            prev_name: None,
            num_stops_to_node: 0,
        }
    }
}

/// Lexicographic cost triple. Datetimes are encoded as seconds so the
/// "latest possible" components can ride along negated.
type CostKey = (i64, u32, i64);

fn seconds(datetime: NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp()
}

fn cost_key(depart: bool, node: &PreviousNode) -> CostKey {
    edge_cost_key(
        depart,
        node.arrival_time,
        node.departure_time,
        node.num_stops_to_node,
    )
}

fn edge_cost_key(
    depart: bool,
    arrival_time: NaiveDateTime,
    departure_time: NaiveDateTime,
    num_stops: u32,
) -> CostKey {
    if depart {
        // Earliest arrival, fewest legs, latest departure.
        (seconds(arrival_time), num_stops, -seconds(departure_time))
    } else {
        // Latest departure, fewest legs, earliest arrival.
        (-seconds(departure_time), num_stops, seconds(arrival_time))
    }
}

/// Finds an itinerary from `origin` to `destination`.
///
/// With `depart == true` the traveler leaves `origin` no earlier than
/// `trip_datetime` and the search minimizes `(arrival time, number of
/// legs, -departure time)`; with `depart == false` the traveler reaches
/// `destination` no later than `trip_datetime` and the search minimizes
/// `(-departure time, number of legs, arrival time)`. Note that the
/// latest-departure criterion ranks below the leg count: an itinerary
/// with more legs never wins on departure time alone.
///
/// The endpoints may be catalog stop names or any strings some agency
/// can interpret; they are trimmed of surrounding whitespace. Each
/// enabled agency is handed the endpoints through
/// `use_origin_destination` before the search starts.
///
/// # Errors
/// [`Error::ItineraryNotPossible`] when the endpoints are equal, no
/// agency recognizes one of them, or no continuous path exists.
/// [`Error::Cancelled`] when the context deadline passes mid-search.
pub fn find_itinerary(
    agencies: &mut [Box<dyn Agency>],
    catalog: &StopsCatalog,
    origin: &str,
    destination: &str,
    trip_datetime: NaiveDateTime,
    depart: bool,
    ctx: &SearchContext,
) -> Result<Vec<Direction>, Error> {
    let origin = origin.trim();
    let destination = destination.trim();
    for agency in agencies.iter_mut() {
        agency.use_origin_destination(origin, destination);
    }
    let enabled: Vec<&dyn Agency> = agencies.iter().map(|agency| agency.as_ref()).collect();
    solve(&enabled, catalog, origin, destination, trip_datetime, depart, ctx)
}

/// The search proper, over an already-prepared agency set. Callers
/// must have trimmed the endpoints and run `use_origin_destination`.
pub(crate) fn solve(
    agencies: &[&dyn Agency],
    catalog: &StopsCatalog,
    origin: &str,
    destination: &str,
    trip_datetime: NaiveDateTime,
    depart: bool,
    ctx: &SearchContext,
) -> Result<Vec<Direction>, Error> {
    if origin.is_empty() || destination.is_empty() || origin == destination {
        return Err(Error::ItineraryNotPossible);
    }

    let extra_nodes = [origin, destination];
    // Forward search grows from the origin towards the destination;
    // reverse search grows from the destination back to the origin.
    let (source, target) = if depart {
        (origin, destination)
    } else {
        (destination, origin)
    };

    let mut previous_node: HashMap<String, PreviousNode> = HashMap::new();
    {
        let entry = previous_node.entry(source.to_string()).or_default();
        if depart {
            entry.arrival_time = trip_datetime;
        } else {
            entry.departure_time = trip_datetime;
        }
    }

    let mut visit_queue: BinaryHeap<MinScored<CostKey, String>> = BinaryHeap::new();
    visit_queue.push(MinScored((i64::MIN, 0, i64::MIN), source.to_string()));
    let mut visited: HashSet<String> = HashSet::new();

    while let Some(MinScored(_, current)) = visit_queue.pop() {
        if ctx.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if !visited.insert(current.clone()) {
            continue;
        }
        if current == target {
            break;
        }

        let (anchor, consecutive, num_stops) = {
            let node = previous_node.entry(current.clone()).or_default();
            let anchor = if depart {
                Anchor::DepartAfter(node.arrival_time)
            } else {
                Anchor::ArriveBefore(node.departure_time)
            };
            (anchor, node.agency, node.num_stops_to_node)
        };

        for edge in weighted_edges(
            agencies,
            catalog,
            current.as_str(),
            anchor,
            consecutive,
            &extra_nodes,
            ctx,
        ) {
            let neighbor = if depart { &edge.to_node } else { &edge.from_node };
            let num_stops_new = num_stops + 1;
            let key_new = edge_cost_key(
                depart,
                edge.datetime_arrive,
                edge.datetime_depart,
                num_stops_new,
            );
            let entry = previous_node.entry(neighbor.clone()).or_default();
            if key_new < cost_key(depart, entry) {
                *entry = PreviousNode {
                    agency: Some(edge.agency),
                    arrival_time: edge.datetime_arrive,
                    departure_time: edge.datetime_depart,
                    instruction: Some(edge.instruction),
                    intermediate_stops: edge.intermediate_stops,
                    prev_name: Some(current.clone()),
                    num_stops_to_node: num_stops_new,
                };
                visit_queue.push(MinScored(key_new, neighbor.clone()));
            }
        }
    }
    debug!(
        "search {origin} -> {destination}: {} nodes closed",
        visited.len()
    );

    let reached = previous_node
        .get(target)
        .is_some_and(|node| node.prev_name.is_some());
    if !reached {
        return Err(Error::ItineraryNotPossible);
    }

    // Retrace the chosen edges into travel order. The source's own
    // sentinel entry has no predecessor and is not emitted as a leg.
    let mut itinerary = Vec::new();
    let mut current = target.to_string();
    loop {
        let node = &previous_node[current.as_str()];
        let (Some(prev), Some(agency)) = (node.prev_name.clone(), node.agency) else {
            break;
        };
        let (from_node, to_node) = if depart {
            (prev.clone(), current)
        } else {
            (current, prev.clone())
        };
        itinerary.push(Direction {
            from_node,
            to_node,
            datetime_depart: node.departure_time,
            datetime_arrive: node.arrival_time,
            instruction: node.instruction.clone().unwrap_or_default(),
            intermediate_stops: node.intermediate_stops.clone(),
            agency,
        });
        current = prev;
    }
    if depart {
        itinerary.reverse();
    }
    Ok(itinerary)
}
