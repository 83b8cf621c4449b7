mod components;
mod csgraph;
mod edge_list;
mod laplacian;

pub use components::*;
pub use csgraph::*;
pub use edge_list::*;
pub use laplacian::*;
