//! The weighted-edge generator: connects one anchor node to every
//! candidate neighbor through every enabled agency.
//!
//! For a fixed anchor node and time it enumerates `(agency, neighbor)`
//! pairs over the stop catalog plus any extra nodes (the request's
//! origin and destination), asks each agency for its best edge, and
//! yields the first edge each agency produces. Emission order is
//! unspecified; the solver orders candidates through its heap.

use itertools::iproduct;

use crate::agency::{Agency, AgencyKind, Anchor, Direction, SearchContext};
use crate::stops::StopsCatalog;

/// Lazily generates directed, weighted edges incident to `known_node`.
///
/// With a [`Anchor::DepartAfter`] anchor the edges lead out of
/// `known_node`; with [`Anchor::ArriveBefore`] they lead into it.
/// `consecutive` is the kind of the agency that produced the adjacent
/// edge in the path under construction, forwarded to every agency for
/// its anti-chaining policy.
pub fn weighted_edges<'a>(
    agencies: &'a [&'a dyn Agency],
    catalog: &'a StopsCatalog,
    known_node: &'a str,
    anchor: Anchor,
    consecutive: Option<AgencyKind>,
    extra_nodes: &'a [&'a str],
    ctx: &'a SearchContext,
) -> impl Iterator<Item = Direction> + 'a {
    let neighbors = catalog
        .names()
        .iter()
        .map(String::as_str)
        .chain(
            extra_nodes
                .iter()
                .copied()
                .filter(|node| !catalog.contains(node)),
        )
        .filter(move |node| *node != known_node);
    iproduct!(neighbors, agencies.iter().copied()).filter_map(move |(node, agency)| {
        let (from, to) = if anchor.is_arrival() {
            (node, known_node)
        } else {
            (known_node, node)
        };
        agency.edges_between(from, to, anchor, consecutive, ctx).next()
    })
}
