use crate::errors::RoutePlannerError;
use crate::geometry::Point;
use crate::model::RouteModel;

use super::{NO_PARENT, SearchState};


/// A planned route: the node coordinates from start to goal (independent
/// snapshots, not references into the model) and the total traversed
/// distance in real-world units.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub nodes: Vec<Point>,
    pub distance: f64,
}

impl Route {

    /// Zero-length route for a search whose start and goal resolve to the
    /// same node
    pub(crate) fn single(point: Point) -> Self {
        Self {
            nodes: vec![point],
            distance: 0.0,
        }
    }
}


/// Walk the parent chain from the goal back to the start sentinel,
/// accumulating edge distances, then reverse so the route runs start to
/// goal. The accumulated distance is scaled to real-world units.
pub(crate) fn construct_final_path(
    model: &RouteModel,
    state: &SearchState,
    end_node: usize,
) -> Result<Route, RoutePlannerError> {

    let mut nodes = Vec::new();
    let mut distance = 0.0;
    let mut current = end_node;

    loop {
        nodes.push(model.point(current).clone());

        let &(parent, _) = state.get(&current).ok_or(RoutePlannerError::NoPathFound)?;
        if parent == NO_PARENT {
            break;
        }

        distance += model.distance(current, parent);
        current = parent;
    }

    // The walk runs goal to start, the route should run start to goal
    nodes.reverse();

    Ok(Route {
        nodes,
        distance: distance * model.metric_scale(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    #[test]
    fn test_reconstruction_walks_parent_chain() {
        // 0 -- 1 -- 2 with unit spacing, scaled by 100
        let model = RouteModel::new(
            vec![point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)],
            vec![vec![0, 1, 2]],
            100.0,
        )
        .unwrap();

        let mut state = SearchState::default();
        state.insert(0, (NO_PARENT, 0.0));
        state.insert(1, (0, 1.0));
        state.insert(2, (1, 2.0));

        let route = construct_final_path(&model, &state, 2).unwrap();
        assert_eq!(
            route.nodes,
            vec![point(0.0, 0.0), point(1.0, 0.0), point(2.0, 0.0)]
        );
        assert_eq!(route.distance, 200.0);

        // A shorter walk from an intermediate goal
        let partial = construct_final_path(&model, &state, 1).unwrap();
        assert_eq!(partial.nodes.len(), 2);
        assert_eq!(partial.distance, 100.0);
    }

    #[test]
    fn test_reconstruction_of_undiscovered_goal_fails() {
        let model = RouteModel::new(
            vec![point(0.0, 0.0), point(1.0, 0.0)],
            vec![vec![0, 1]],
            1.0,
        )
        .unwrap();

        let state = SearchState::default();
        let result = construct_final_path(&model, &state, 1);
        assert!(matches!(result, Err(RoutePlannerError::NoPathFound)));
    }
}
