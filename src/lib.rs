//! # routeplan
//!
//! Point-to-point shortest path routing over road-network graphs.
//!
//! A [`model::RouteModel`] holds intersections (nodes in normalized 0-1 map
//! space) connected by ways, and answers nearest-node queries through a
//! kd-tree. A [`planner::RoutePlanner`] resolves two percentage-scaled
//! coordinates to graph nodes and runs
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) between them,
//! returning the ordered node sequence and the total distance in real-world
//! units.

pub mod errors;
pub mod geometry;
pub mod model;
pub mod planner;
