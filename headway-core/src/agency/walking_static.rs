//! The static walking agency: pre-baked pedestrian distances between
//! known stops, shipped as a bincode blob by an external pipeline.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Duration;
use hashbrown::HashMap;
use log::info;
use serde::{Deserialize, Serialize};

use super::{Agency, AgencyKind, Anchor, Direction, SearchContext};
use crate::{Error, WALK_SPEED};

/// Walking distance in metres between two named stops. Paths are
/// undirected; one record covers both orientations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkPath {
    pub from: String,
    pub to: String,
    pub meters: f64,
}

/// The pre-baked distance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkingMatrix {
    pub paths: Vec<WalkPath>,
}

impl WalkingMatrix {
    /// # Errors
    /// [`Error::AgencyUnavailable`] when the blob is missing or does
    /// not decode.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::AgencyUnavailable(format!("walking distances {}: {e}", path.display()))
        })?;
        bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
            Error::AgencyUnavailable(format!("walking distances {}: {e}", path.display()))
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        Ok(bincode::serialize_into(writer, self)?)
    }
}

pub struct WalkingStaticAgency {
    // Both orientations of every path, so lookups stay allocation-free.
    distances: HashMap<(String, String), f64>,
}

impl WalkingStaticAgency {
    #[must_use]
    pub fn new(matrix: WalkingMatrix) -> Self {
        let mut distances = HashMap::with_capacity(matrix.paths.len() * 2);
        for path in matrix.paths {
            distances.insert((path.from.clone(), path.to.clone()), path.meters);
            distances.insert((path.to, path.from), path.meters);
        }
        WalkingStaticAgency { distances }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let matrix = WalkingMatrix::load(path)?;
        info!("walking distances loaded: {} paths", matrix.paths.len());
        Ok(Self::new(matrix))
    }

    fn meters_between(&self, from: &str, to: &str) -> Option<f64> {
        self.distances
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }
}

impl Agency for WalkingStaticAgency {
    fn kind(&self) -> AgencyKind {
        AgencyKind::WalkingStatic
    }

    fn edges_between<'a>(
        &'a self,
        from: &str,
        to: &str,
        anchor: Anchor,
        consecutive: Option<AgencyKind>,
        ctx: &SearchContext,
    ) -> Box<dyn Iterator<Item = Direction> + 'a> {
        // Walking may not immediately follow another walking leg.
        if consecutive.is_some_and(AgencyKind::is_walking) {
            return Box::new(std::iter::empty());
        }
        let Some(meters) = self.meters_between(from, to) else {
            return Box::new(std::iter::empty());
        };
        let seconds = meters / WALK_SPEED;
        if !ctx.walk_limit.allows(seconds) {
            return Box::new(std::iter::empty());
        }
        Box::new(walk_edge(from, to, anchor, seconds, AgencyKind::WalkingStatic).into_iter())
    }
}

/// Builds the single walking leg both walking agencies emit.
pub(super) fn walk_edge(
    from: &str,
    to: &str,
    anchor: Anchor,
    seconds: f64,
    kind: AgencyKind,
) -> Option<Direction> {
    let duration = Duration::milliseconds((seconds * 1000.0).round() as i64);
    let (datetime_depart, datetime_arrive) = match anchor {
        Anchor::DepartAfter(t) => (t, t.checked_add_signed(duration)?),
        Anchor::ArriveBefore(t) => (t.checked_sub_signed(duration)?, t),
    };
    let minutes = (seconds / 60.0).ceil().max(1.0) as i64;
    Some(Direction {
        from_node: from.to_string(),
        to_node: to.to_string(),
        datetime_depart,
        datetime_arrive,
        instruction: format!("Walk from {from} to {to} (about {minutes} min)"),
        intermediate_stops: Vec::new(),
        agency: kind,
    })
}
