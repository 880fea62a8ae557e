//! Pack optimizer.
//!
//! Works out how many packs of each allowed size to ship for an order: never
//! less than requested, with the smallest possible overage, and the fewest
//! packs among the answers with that overage.
//!
//! The remaining quantity is modelled as a graph. Starting from the order
//! quantity, every pack size is subtracted until the remainder drops to zero
//! or below. Nodes are memoized by value so the same remainder reached through
//! different pack orders is one node. The terminal node closest to zero gives
//! the overage, and a breadth-first search to it gives the fewest packs.
//!
//! ```
//! let packs = packs::solve(12001, &[250, 500, 1000, 2000, 5000]).unwrap();
//! assert_eq!(packs.to_string(), "1x 250\n1x 2000\n2x 5000");
//! ```

pub mod error;
pub mod generator;
pub mod graph;
pub mod pruner;
pub mod search;
pub mod selector;
pub mod solver;
pub mod viz;

pub use error::{InvalidInput, SolveError};
pub use graph::{Edge, EdgeId, Graph, Node, NodeId};
pub use solver::{solve, solve_with, PackCalc, PackSizes, Packs, SolverConfig};
