mod route;

pub use route::Route;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use indexmap::map::Entry::{Occupied, Vacant};
use log::{debug, info};
use rustc_hash::FxHasher;

use crate::errors::RoutePlannerError;
use crate::model::RouteModel;

/// Use indexmap for fast lookups and rustc_hash for fast hashing
type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Per-search scoring state, externalized from the graph so the model stays
/// immutable during a search and repeated searches need no reset pass.
/// Maps node index -> (parent node index, g-value). A node present in the
/// map has been discovered; its recorded g-value is the best known cost
/// from the start and only ever decreases.
pub(crate) type SearchState = FxIndexMap<usize, (usize, f64)>;

/// Parent sentinel for the start node
pub(crate) const NO_PARENT: usize = usize::MAX;


/// Frontier entry: a discovered node with the g-value it was pushed with
/// and its f-value (g + h). Entries are immutable once pushed; when a node
/// is relaxed a fresh entry is pushed and the stale one is skipped on pop.
#[derive(Debug)]
struct OpenNode {
    node: usize,
    g_value: f64,
    f_value: f64,
}

// BinaryHeap is a max-heap, so the ordering is reversed to pop the minimum
// f-value first. Ties on f prefer the larger g-value (the deeper node).
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_value
            .total_cmp(&self.f_value)
            .then_with(|| self.g_value.total_cmp(&other.g_value))
    }
}
impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.f_value == other.f_value && self.g_value == other.g_value
    }
}
impl Eq for OpenNode {}


/// A* search between two coordinates on a [`RouteModel`].
///
/// Construction resolves the coordinates to graph nodes; [`search`] runs
/// the algorithm. The heuristic is the straight-line distance to the goal,
/// the same metric as the edge costs, so it is admissible and consistent
/// and the returned route is optimal.
///
/// [`search`]: RoutePlanner::search
pub struct RoutePlanner<'a> {
    model: &'a RouteModel,
    start_node: usize,
    end_node: usize,
}

impl<'a> RoutePlanner<'a> {

    /// Resolve start and end coordinates, given as percentages of the map
    /// extent (0-100), to their closest graph nodes. Out-of-range
    /// coordinates resolve to the nearest existing node. No search work
    /// happens here.
    pub fn new(
        model: &'a RouteModel,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    ) -> Result<Self, RoutePlannerError> {

        // Percentages of map extent -> normalized 0-1 model space
        let start_node = model.find_closest_node(start_x * 0.01, start_y * 0.01)?;
        let end_node = model.find_closest_node(end_x * 0.01, end_y * 0.01)?;

        Ok(Self {
            model,
            start_node,
            end_node,
        })
    }

    /// Graph node the start coordinates resolved to
    pub fn start_node(&self) -> usize {
        self.start_node
    }

    /// Graph node the end coordinates resolved to
    pub fn end_node(&self) -> usize {
        self.end_node
    }

    /// Heuristic: straight-line distance from `node` to the goal. Pure
    /// function of the node and the fixed goal.
    fn h_value(&self, node: usize) -> f64 {
        self.model.distance(node, self.end_node)
    }

    /// Run the A* search and return the route from start to goal.
    ///
    /// A node is closed when it is popped from the frontier as the minimum,
    /// not when first discovered; while still open its g-value can be
    /// relaxed if a cheaper path to it is found. If the frontier empties
    /// before the goal is reached there is no path and
    /// [`RoutePlannerError::NoPathFound`] is returned.
    pub fn search(&self) -> Result<Route, RoutePlannerError> {

        // Degenerate input: both coordinates resolved to the same node
        if self.start_node == self.end_node {
            return Ok(Route::single(self.model.point(self.start_node).clone()));
        }

        let mut open_list: BinaryHeap<OpenNode> = BinaryHeap::new();
        let mut state = SearchState::default();

        state.insert(self.start_node, (NO_PARENT, 0.0));
        open_list.push(OpenNode {
            node: self.start_node,
            g_value: 0.0,
            f_value: self.h_value(self.start_node),
        });

        let mut expanded = 0usize;

        while let Some(OpenNode { node, g_value, .. }) = open_list.pop() {

            // fetch current best cost for node - every pushed node is in the map
            let &(_, best_g) = state.get(&node).unwrap();

            // A popped entry with a worse g than the map's best is stale:
            // the node was relaxed after this entry was pushed
            if g_value > best_g {
                continue;
            }

            if node == self.end_node {
                let found = route::construct_final_path(self.model, &state, self.end_node)?;
                info!(
                    "route found: {} nodes, distance {:.2} ({} expanded)",
                    found.nodes.len(),
                    found.distance,
                    expanded
                );
                return Ok(found);
            }

            expanded += 1;

            for &neighbor in self.model.neighbors(node) {

                let new_g = g_value + self.model.distance(node, neighbor);

                match state.entry(neighbor) {
                    Vacant(e) => {
                        e.insert((node, new_g));
                    }
                    Occupied(mut e) => {
                        if e.get().1 > new_g {
                            // Cheaper path to a still-open node: re-parent it
                            e.insert((node, new_g));
                        } else {
                            continue;
                        }
                    }
                }

                open_list.push(OpenNode {
                    node: neighbor,
                    g_value: new_g,
                    f_value: new_g + self.h_value(neighbor),
                });
            }
        }

        debug!("frontier exhausted after {expanded} expansions, goal unreachable");
        Err(RoutePlannerError::NoPathFound)
    }
}
