pub mod departures;
pub mod itinerary;
pub mod variator;

pub use departures::departure_list;
pub use itinerary::find_itinerary;
pub use variator::find_itineraries;

use std::cmp::Ordering;

/// `MinScored<K, T>` holds a score `K` and a scored object `T` in a
/// pair for use with a `BinaryHeap`.
///
/// `MinScored` compares in reverse order by the score, so that we can
/// use `BinaryHeap` as a min-heap to extract the score-value pair with
/// the least score. Ties break on `T`, keeping the ordering total.
/// This implementation is based on the one in the `petgraph` crate.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct MinScored<K, T>(pub K, pub T);

impl<K: Ord, T: Ord> PartialOrd for MinScored<K, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord, T: Ord> Ord for MinScored<K, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0).then_with(|| other.1.cmp(&self.1))
    }
}
