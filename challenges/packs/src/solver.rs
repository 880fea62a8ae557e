use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::error::{InvalidInput, SolveError};
use crate::generator::Generator;
use crate::graph::{Edge, Graph};
use crate::pruner::prune;
use crate::search::{BreadthFirst, PathSearch};
use crate::selector::select;

/// Validated pack sizes: positive, deduplicated, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackSizes(Vec<i64>);

impl PackSizes {
    pub fn new(sizes: &[i64]) -> Result<PackSizes, InvalidInput> {
        if sizes.is_empty() {
            return Err(InvalidInput::NoPackSizes);
        }
        if let Some(bad) = sizes.iter().find(|size| **size <= 0) {
            return Err(InvalidInput::NonPositivePackSize(*bad));
        }
        let mut sizes = sizes.to_vec();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes.dedup();
        Ok(PackSizes(sizes))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Stop generating once as many exact (zero overage) hits as there are
    /// pack sizes have been seen. Faster on large inputs, but the pack count
    /// is no longer guaranteed to be minimal.
    pub early_exit: bool,
    /// Reject quantities above this value.
    pub max_quantity: Option<i64>,
    /// Reject requests with more distinct pack sizes than this.
    pub max_pack_sizes: Option<usize>,
    /// Reject requests whose graph could hold more edges than this. Every
    /// remainder between 1 and the quantity may get one edge per size, so
    /// the bound is `quantity * sizes`.
    pub max_edges: Option<u64>,
}

impl SolverConfig {
    /// Checks a request against the configured limits.
    pub fn check(&self, quantity: i64, sizes: &PackSizes) -> Result<(), InvalidInput> {
        if let Some(limit) = self.max_quantity {
            if quantity > limit {
                return Err(InvalidInput::QuantityTooLarge { quantity, limit });
            }
        }
        if let Some(limit) = self.max_pack_sizes {
            if sizes.len() > limit {
                return Err(InvalidInput::TooManyPackSizes {
                    count: sizes.len(),
                    limit,
                });
            }
        }
        if let Some(limit) = self.max_edges {
            let edges = u64::try_from(quantity)
                .unwrap_or(0)
                .saturating_mul(sizes.len() as u64);
            if edges > limit {
                return Err(InvalidInput::TooMuchWork {
                    quantity,
                    sizes: sizes.len(),
                    edges,
                    limit,
                });
            }
        }
        Ok(())
    }
}

/// Pack size to number of packs. Only sizes actually shipped are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packs(BTreeMap<i64, u64>);

impl Packs {
    /// Counts the pack size of every edge on a path.
    pub fn tally<'a>(path: impl IntoIterator<Item = &'a Edge>) -> Packs {
        let mut counts = BTreeMap::new();
        for edge in path {
            *counts.entry(edge.pack_size).or_insert(0) += 1;
        }
        Packs(counts)
    }

    pub fn get(&self, size: i64) -> u64 {
        self.0.get(&size).copied().unwrap_or(0)
    }

    /// Entries ordered by pack size, smallest first.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.0.iter().map(|(size, count)| (*size, *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_packs(&self) -> u64 {
        self.0.values().sum()
    }

    /// Total number of items shipped. Widened so that any count of any
    /// valid size fits.
    pub fn shipped(&self) -> i128 {
        self.iter()
            .map(|(size, count)| i128::from(size) * i128::from(count))
            .sum()
    }

    pub fn as_map(&self) -> &BTreeMap<i64, u64> {
        &self.0
    }
}

impl FromIterator<(i64, u64)> for Packs {
    fn from_iter<T: IntoIterator<Item = (i64, u64)>>(iter: T) -> Self {
        Packs(iter.into_iter().filter(|(_, count)| *count > 0).collect())
    }
}

/// One line per size: `{count}x {size}`.
impl fmt::Display for Packs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (size, count)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}x {}", count, size)?;
        }
        Ok(())
    }
}

/// A single solve. Owns the graph it builds, which stays available after
/// [`PackCalc::calculate`] for inspection or rendering.
#[derive(Debug)]
pub struct PackCalc {
    quantity: i64,
    sizes: PackSizes,
    config: SolverConfig,
    graph: Graph,
    path: Vec<Edge>,
}

impl PackCalc {
    pub fn new(quantity: i64, sizes: &[i64]) -> Result<PackCalc, SolveError> {
        PackCalc::with_config(quantity, sizes, SolverConfig::default())
    }

    pub fn with_config(
        quantity: i64,
        sizes: &[i64],
        config: SolverConfig,
    ) -> Result<PackCalc, SolveError> {
        let sizes = PackSizes::new(sizes)?;
        config.check(quantity, &sizes)?;
        Ok(PackCalc {
            quantity,
            sizes,
            config,
            graph: Graph::new(),
            path: Vec::new(),
        })
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn pack_sizes(&self) -> &PackSizes {
        &self.sizes
    }

    /// The pruned graph left by the last calculation.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The edges picked by the last calculation, root first.
    pub fn path(&self) -> &[Edge] {
        &self.path
    }

    pub fn calculate(&mut self) -> Result<Packs, SolveError> {
        self.graph = Graph::new();
        self.path.clear();
        if self.quantity <= 0 {
            return Ok(Packs::default());
        }

        let root = self.graph.create_node(self.quantity);
        let mut generator = Generator::new(&mut self.graph);
        if self.config.early_exit {
            generator = generator.with_early_exit(self.sizes.len());
        }
        let candidates = generator.generate(root, self.sizes.as_slice());

        let quantity = self.quantity;
        let unreachable = |target| SolveError::Unreachable {
            root: quantity,
            target,
        };
        let selection = select(&candidates).ok_or_else(|| unreachable(0))?;
        debug!(
            "quantity {}: best candidate {} (overage {}) out of {}",
            quantity,
            selection.value,
            selection.overage(),
            candidates.len()
        );

        prune(&mut self.graph, &selection);

        let path = BreadthFirst::new(root)
            .edges_to(&self.graph, selection.chosen)
            .ok_or_else(|| unreachable(selection.value))?;
        let packs = Packs::tally(&path);
        self.path = path;
        Ok(packs)
    }
}

/// Packs to ship for `quantity` using the given sizes.
pub fn solve(quantity: i64, sizes: &[i64]) -> Result<Packs, SolveError> {
    PackCalc::new(quantity, sizes)?.calculate()
}

pub fn solve_with(
    quantity: i64,
    sizes: &[i64],
    config: &SolverConfig,
) -> Result<Packs, SolveError> {
    PackCalc::with_config(quantity, sizes, config.clone())?.calculate()
}
