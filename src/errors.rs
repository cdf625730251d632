use std::fmt;

#[derive(Debug)]
pub enum RoutePlannerError {
    NoPathFound, // Start and goal are in disconnected components
    EmptyGraph, // Model has no nodes, closest-node queries cannot succeed
    InvalidWay { way: usize, node: usize }, // Way references a node outside the node table
    KdTreeError(String),
}

impl fmt::Display for RoutePlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePlannerError::NoPathFound => write!(f, "no path found between start and goal"),
            RoutePlannerError::EmptyGraph => write!(f, "route model contains no nodes"),
            RoutePlannerError::InvalidWay { way, node } => {
                write!(f, "way {way} references unknown node {node}")
            }
            RoutePlannerError::KdTreeError(msg) => write!(f, "kd-tree error: {msg}"),
        }
    }
}

impl std::error::Error for RoutePlannerError {}

impl From<kdtree::ErrorKind> for RoutePlannerError {
    fn from(error: kdtree::ErrorKind) -> Self {
        RoutePlannerError::KdTreeError(error.to_string())
    }
}
