use std::collections::HashMap;

use prettytable::{Cell, Row, Table};

use crate::solver::constraint::ConstraintId;
use crate::solver::model::Model;

/// Counters describing a single search run.
#[derive(Debug, Default)]
pub struct SearchStats {
    /// The number of selection rounds entered.
    pub nodes_visited: u64,
    /// The number of times the search backtracked.
    pub backtracks: u64,
    /// The number of worklist entries processed during propagation.
    pub propagation_rounds: u64,
    /// The number of solutions recorded.
    pub solutions_found: u64,
    /// Per-constraint `propagate` invocation counts.
    pub revisions: HashMap<ConstraintId, u64>,
}

impl SearchStats {
    pub(crate) fn record_revision(&mut self, constraint: ConstraintId) {
        *self.revisions.entry(constraint).or_default() += 1;
    }

    pub(crate) fn reset(&mut self) {
        *self = SearchStats::default();
    }
}

/// Renders the statistics of a run as a printable table.
pub fn render_stats_table(stats: &SearchStats, model: &Model) -> String {
    let mut summary = Table::new();
    summary.add_row(Row::new(vec![
        Cell::new("Nodes Visited"),
        Cell::new("Backtracks"),
        Cell::new("Propagation Rounds"),
        Cell::new("Solutions"),
    ]));
    summary.add_row(Row::new(vec![
        Cell::new(&stats.nodes_visited.to_string()),
        Cell::new(&stats.backtracks.to_string()),
        Cell::new(&stats.propagation_rounds.to_string()),
        Cell::new(&stats.solutions_found.to_string()),
    ]));

    let mut constraints = Table::new();
    constraints.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Constraint"),
        Cell::new("Revisions"),
    ]));

    let mut sorted: Vec<(&ConstraintId, &u64)> = stats.revisions.iter().collect();
    sorted.sort_by_key(|(id, _)| **id);

    for (constraint_id, revisions) in sorted {
        constraints.add_row(Row::new(vec![
            Cell::new(&constraint_id.to_string()),
            Cell::new(model.constraint_name(*constraint_id)),
            Cell::new(&revisions.to_string()),
        ]));
    }

    format!("{summary}\n{constraints}")
}
