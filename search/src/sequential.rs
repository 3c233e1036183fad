//! Single-process A* reference.
//!
//! Uses the same [`Frontier`] and [`DuplicateTable`] as the distributed
//! worker, with the same pop-time duplicate policy, and stops at the first
//! goal popped. With an admissible heuristic that goal is optimal, so a
//! one-worker distributed run must agree with it on cost.

use hdastar_kernel::carrier::packed::PackedState;

use crate::closed::{Admission, DuplicateTable};
use crate::contract::SearchDomain;
use crate::error::SearchError;
use crate::frontier::Frontier;
use crate::node::{Cost, SearchNode};
use crate::policy::EngineConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialOutcome {
    /// Optimal cost, or `None` if no goal beats the initial incumbent.
    pub cost: Option<Cost>,
    pub goal: Option<PackedState>,
    pub expansions: u64,
    pub generations: u64,
}

/// Run A* from `root`.
///
/// Only the capacity, incumbent and operator knobs of `config` apply;
/// `worker_count` and the outgoing threshold are ignored.
///
/// # Errors
///
/// [`SearchError::InvalidConfig`] if `config` fails validation.
pub fn sequential_search<D: SearchDomain>(
    domain: &D,
    root: &D::State,
    config: &EngineConfig,
) -> Result<SequentialOutcome, SearchError> {
    config.validate()?;
    let mut frontier = Frontier::new(config.frontier_capacity, config.frontier_overrun);
    let mut closed = DuplicateTable::new(config.closed_capacity);
    let mut ops = Vec::new();
    let mut outcome = SequentialOutcome {
        cost: None,
        goal: None,
        expansions: 0,
        generations: 0,
    };

    let packed = domain.pack(root);
    frontier.push(SearchNode::new(packed, 0, domain.heuristic(root), 0, None));

    while !frontier.is_empty_under(config.initial_incumbent) {
        let Some(node) = frontier.pop() else {
            break;
        };
        if closed.admit(&node) == Admission::Discard {
            continue;
        }
        let mut state = domain.unpack(&node.packed);
        if domain.is_goal(&state) {
            outcome.cost = Some(node.g);
            outcome.goal = Some(node.packed);
            break;
        }

        let (g, last_op) = (node.g, node.last_op);
        closed.add(node);
        outcome.expansions += 1;

        ops.clear();
        domain.operators(&state, &mut ops);
        for &op in &ops {
            if config.skip_inverse_operator && last_op == Some(op) {
                continue;
            }
            let edge = domain.apply(&mut state, op);
            let child = SearchNode::new(
                domain.pack(&state),
                g.saturating_add(edge.cost),
                domain.heuristic(&state),
                0,
                edge.inverse,
            );
            domain.undo(&mut state, &edge);
            outcome.generations += 1;
            frontier.push(child);
        }
    }

    tracing::debug!(
        cost = ?outcome.cost,
        expansions = outcome.expansions,
        generations = outcome.generations,
        "sequential search finished"
    );
    Ok(outcome)
}
