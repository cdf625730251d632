use std::cell::OnceCell;

use kdtree::KdTree;
use kdtree::distance::squared_euclidean as kt_squared_euclidean;

use crate::errors::RoutePlannerError;
use crate::geometry::Point;
use crate::planner::{Route, RoutePlanner};


/// Road-network graph: intersections in normalized 0-1 map space connected
/// by ways (ordered node sequences).
///
/// Per-node neighbor lists are derived lazily from the way sequences the
/// first time a node is queried and cached, so the model API stays `&self`
/// during a search. Closest-node lookups run against a kd-tree built at
/// construction time.
pub struct RouteModel {
    nodes: Vec<Point>,
    ways: Vec<Vec<usize>>,
    neighbors: Vec<OnceCell<Vec<usize>>>,
    tree: KdTree<f64, usize, [f64; 2]>,
    metric_scale: f64,
    /// Most recently planned route, for the rendering layer to consume
    pub path: Option<Route>,
}

impl RouteModel {

    /// Build a model from node coordinates and way node-sequences.
    /// `metric_scale` converts normalized-space distances to real-world
    /// units (e.g. meters per map unit).
    pub fn new(
        nodes: Vec<Point>,
        ways: Vec<Vec<usize>>,
        metric_scale: f64,
    ) -> Result<Self, RoutePlannerError> {

        if nodes.is_empty() {
            return Err(RoutePlannerError::EmptyGraph);
        }

        // Every way node must exist in the node table
        for (way_idx, way) in ways.iter().enumerate() {
            if let Some(&node) = way.iter().find(|&&n| n >= nodes.len()) {
                return Err(RoutePlannerError::InvalidWay { way: way_idx, node });
            }
        }

        let mut tree = KdTree::new(2);
        for (idx, point) in nodes.iter().enumerate() {
            tree.add([point.x, point.y], idx)?;
        }

        let neighbors = (0..nodes.len()).map(|_| OnceCell::new()).collect();

        Ok(Self {
            nodes,
            ways,
            neighbors,
            tree,
            metric_scale,
            path: None,
        })
    }

    /// Number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Coordinates of a node
    pub fn point(&self, node: usize) -> &Point {
        &self.nodes[node]
    }

    /// Straight-line distance between two nodes in normalized space
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.nodes[a].distance(&self.nodes[b])
    }

    /// Scale factor from normalized-space distance to real-world units
    pub fn metric_scale(&self) -> f64 {
        self.metric_scale
    }

    /// Nearest graph node to the given normalized coordinates.
    /// Out-of-range coordinates degrade to the nearest existing node rather
    /// than failing; the graph is non-empty by construction.
    pub fn find_closest_node(&self, x: f64, y: f64) -> Result<usize, RoutePlannerError> {
        let found = self.tree.nearest(&[x, y], 1, &kt_squared_euclidean)?;

        found
            .first()
            .map(|&(_, &idx)| idx)
            .ok_or(RoutePlannerError::EmptyGraph)
    }

    /// Nodes adjacent to `node` along any way. Computed from the way
    /// sequences on first call and cached; repeated calls return the same
    /// list without recomputation.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.neighbors[node].get_or_init(|| self.find_neighbors(node))
    }

    /// Scan the ways for every position of `node` and collect the nodes on
    /// either side of it. Ways are traversable in both directions.
    fn find_neighbors(&self, node: usize) -> Vec<usize> {
        let mut found = Vec::new();

        for way in &self.ways {
            for (pos, &n) in way.iter().enumerate() {
                if n != node {
                    continue;
                }
                if pos > 0 {
                    found.push(way[pos - 1]);
                }
                if pos + 1 < way.len() {
                    found.push(way[pos + 1]);
                }
            }
        }

        // A node can sit on several ways; drop duplicate adjacencies
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Plan a route between two percentage-scaled coordinates (0-100 of map
    /// extent) and store it in [`RouteModel::path`].
    pub fn plan_route(
        &mut self,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
    ) -> Result<&Route, RoutePlannerError> {

        let route = RoutePlanner::new(self, start_x, start_y, end_x, end_y)?.search()?;
        Ok(self.path.insert(route))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> Vec<Point> {
        // 0 -- 1 -- 2
        //      |
        //      3
        vec![
            Point { x: 0.0, y: 0.0 },
            Point { x: 0.5, y: 0.0 },
            Point { x: 1.0, y: 0.0 },
            Point { x: 0.5, y: 0.5 },
        ]
    }

    #[test]
    fn test_empty_model_is_rejected() {
        let result = RouteModel::new(vec![], vec![], 1.0);
        assert!(matches!(result, Err(RoutePlannerError::EmptyGraph)));
    }

    #[test]
    fn test_way_with_unknown_node_is_rejected() {
        let result = RouteModel::new(grid_points(), vec![vec![0, 1, 9]], 1.0);
        assert!(matches!(
            result,
            Err(RoutePlannerError::InvalidWay { way: 0, node: 9 })
        ));
    }

    #[test]
    fn test_find_closest_node() {
        let model = RouteModel::new(grid_points(), vec![vec![0, 1, 2]], 1.0).unwrap();

        assert_eq!(model.find_closest_node(0.0, 0.0).unwrap(), 0);
        assert_eq!(model.find_closest_node(0.45, 0.1).unwrap(), 1);
    }

    #[test]
    fn test_find_closest_node_clamps_out_of_range_input() {
        let model = RouteModel::new(grid_points(), vec![vec![0, 1, 2]], 1.0).unwrap();

        // Queries far outside the map still resolve to the nearest node
        assert_eq!(model.find_closest_node(50.0, 0.0).unwrap(), 2);
        assert_eq!(model.find_closest_node(-10.0, -10.0).unwrap(), 0);
    }

    #[test]
    fn test_neighbors_follow_way_adjacency() {
        let model =
            RouteModel::new(grid_points(), vec![vec![0, 1, 2], vec![1, 3]], 1.0).unwrap();

        // Middle of a way sees both sides plus the junction way
        assert_eq!(model.neighbors(1), &[0, 2, 3]);
        // Way endpoints see one side
        assert_eq!(model.neighbors(0), &[1]);
        assert_eq!(model.neighbors(3), &[1]);
    }

    #[test]
    fn test_neighbors_are_idempotent_and_deduplicated() {
        // Node 1 is adjacent to node 0 on two separate ways
        let model =
            RouteModel::new(grid_points(), vec![vec![0, 1], vec![1, 0], vec![1, 2]], 1.0)
                .unwrap();

        let first: Vec<usize> = model.neighbors(1).to_vec();
        let second: Vec<usize> = model.neighbors(1).to_vec();

        assert_eq!(first, vec![0, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let model = RouteModel::new(grid_points(), vec![vec![0, 1, 2]], 1.0).unwrap();

        assert_eq!(model.distance(0, 2), model.distance(2, 0));
        assert_eq!(model.distance(0, 2), 1.0);
    }
}
