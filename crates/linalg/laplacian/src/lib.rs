mod alias;
mod arena;
mod condition;
mod degree_queue;
mod edge_factor;
mod factor;
mod mirror;
mod order;
mod pcg;
mod sketch;
mod solve;
mod solver;

pub use alias::*;
pub use arena::*;
pub use condition::*;
pub use degree_queue::*;
pub use edge_factor::*;
pub use factor::*;
pub use mirror::*;
pub use order::*;
pub use pcg::*;
pub use sketch::*;
pub use solve::*;
pub use solver::*;
