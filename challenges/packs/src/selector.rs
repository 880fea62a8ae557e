use crate::generator::Candidates;
use crate::graph::NodeId;

/// The terminal state chosen as the search target, along with the ones that
/// lost to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub chosen: NodeId,
    pub value: i64,
    pub rejected: Vec<NodeId>,
}

impl Selection {
    /// Amount shipped above the requested quantity.
    pub fn overage(&self) -> i64 {
        -self.value
    }
}

/// Picks the candidate closest to zero, i.e. the one with the least overage.
/// Returns `None` only when there are no candidates at all.
pub fn select(candidates: &Candidates) -> Option<Selection> {
    let mut ranked = candidates.by_overage();
    let (value, chosen) = ranked.next()?;
    Some(Selection {
        chosen,
        value,
        rejected: ranked.map(|(_, node)| node).collect(),
    })
}
