//! The dynamic walking agency: on-demand great-circle walking between
//! any two resolvable points.
//!
//! Known stop names resolve through the shared catalog; free-form
//! endpoints are captured per request by `use_origin_destination`,
//! which accepts `"lat,lng"` decimal pairs. Anything else stays
//! unresolvable and the pair is simply unserved.

use std::sync::Arc;

use geo::prelude::*;
use geo::Point;
use hashbrown::HashMap;
use log::debug;

use super::walking_static::walk_edge;
use super::{Agency, AgencyKind, Anchor, Direction, SearchContext};
use crate::stops::StopsCatalog;
use crate::WALK_SPEED;

pub struct WalkingDynamicAgency {
    catalog: Arc<StopsCatalog>,
    /// Free-form endpoints of the current request, parsed into points.
    endpoints: HashMap<String, Point<f64>>,
}

impl WalkingDynamicAgency {
    #[must_use]
    pub fn new(catalog: Arc<StopsCatalog>) -> Self {
        WalkingDynamicAgency {
            catalog,
            endpoints: HashMap::new(),
        }
    }

    fn resolve(&self, node: &str) -> Option<Point<f64>> {
        self.catalog
            .point(node)
            .or_else(|| self.endpoints.get(node).copied())
    }
}

/// Parses a `"lat,lng"` pair, e.g. `"40.7295,-73.9965"`.
fn parse_lat_lng(raw: &str) -> Option<Point<f64>> {
    let (lat, lng) = raw.split_once(',')?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(Point::new(lng, lat))
}

impl Agency for WalkingDynamicAgency {
    fn kind(&self) -> AgencyKind {
        AgencyKind::WalkingDynamic
    }

    fn use_origin_destination(&mut self, origin: &str, destination: &str) {
        self.endpoints.clear();
        for endpoint in [origin, destination] {
            if self.catalog.contains(endpoint) {
                continue;
            }
            match parse_lat_lng(endpoint) {
                Some(point) => {
                    self.endpoints.insert(endpoint.to_string(), point);
                }
                None => debug!("unresolvable endpoint {endpoint:?}"),
            }
        }
    }

    fn edges_between<'a>(
        &'a self,
        from: &str,
        to: &str,
        anchor: Anchor,
        consecutive: Option<AgencyKind>,
        ctx: &SearchContext,
    ) -> Box<dyn Iterator<Item = Direction> + 'a> {
        if consecutive.is_some_and(AgencyKind::is_walking) {
            return Box::new(std::iter::empty());
        }
        let (Some(start), Some(end)) = (self.resolve(from), self.resolve(to)) else {
            return Box::new(std::iter::empty());
        };
        let seconds = start.haversine_distance(&end) / WALK_SPEED;
        if !ctx.walk_limit.allows(seconds) {
            return Box::new(std::iter::empty());
        }
        Box::new(walk_edge(from, to, anchor, seconds, AgencyKind::WalkingDynamic).into_iter())
    }
}
