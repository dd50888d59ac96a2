use std::rc::Rc;

use crate::solver::constraint::ConstraintId;
use crate::solver::domain::DomainId;
use crate::solver::index::{Index, Priority, Probability};
use crate::solver::model::Model;

/// A request to lower the probability and/or raise the priority tier of a
/// set of indices within one domain.
///
/// Mutations are created by the domain and variable mutator functions and
/// applied through a [`Mutator`]. While applied, a mutation carries the
/// reverse log needed to restore the indices it replaced.
#[derive(Debug)]
pub struct Mutation {
    domain: Option<DomainId>,
    indices: Vec<usize>,
    probability: Probability,
    priority: Priority,

    contributor: Option<ConstraintId>,
    reverse: Vec<(usize, Rc<Index>)>,
}

impl Mutation {
    /// The mutation that changes nothing.
    pub fn none() -> Self {
        Self {
            domain: None,
            indices: Vec::new(),
            probability: 1.0,
            priority: 0,
            contributor: None,
            reverse: Vec::new(),
        }
    }

    pub(crate) fn new(
        domain: DomainId,
        indices: Vec<usize>,
        probability: Probability,
        priority: Priority,
    ) -> Self {
        Self {
            domain: Some(domain),
            indices,
            probability,
            priority,
            contributor: None,
            reverse: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.domain.is_none() || self.indices.is_empty()
    }

    /// Applies the adjustment to every targeted index, tracking the replaced
    /// index references so they can be restored.
    fn apply(&mut self, model: &mut Model) {
        let Some(domain) = self.domain else { return };

        for &i in &self.indices {
            let current = Rc::clone(model.index(domain, i));
            let Some(adjusted) =
                model
                    .factory
                    .adjust(&current, self.contributor, self.probability, self.priority)
            else {
                continue;
            };
            self.reverse.push((i, current));
            model.set_index(domain, i, adjusted);
        }

        if !self.reverse.is_empty() {
            model.update_domain(domain);
        }
    }

    /// Restores the index references replaced by `apply`. A mutation that
    /// changed nothing reverts nothing.
    fn revert(&mut self, model: &mut Model) {
        let Some(domain) = self.domain else { return };
        if self.reverse.is_empty() {
            return;
        }

        for (i, index) in self.reverse.drain(..).rev() {
            model.set_index(domain, i, index);
        }
        model.update_domain(domain);
    }
}

/// Collects mutations from constraints and applies them transactionally.
///
/// The log carries two cursors: `head` marks the applied prefix, and
/// `prev_head` the value of `head` before the most recent apply, so the last
/// batch can be undone without touching what came before it.
#[derive(Debug)]
pub struct Mutator {
    active_constraint: Option<ConstraintId>,
    mutations: Vec<Mutation>,
    prev_head: usize,
    head: usize,
}

impl Mutator {
    pub(crate) fn new() -> Self {
        Self {
            active_constraint: None,
            mutations: Vec::new(),
            prev_head: 0,
            head: 0,
        }
    }

    /// Called by the engine to tag subsequent additions with the constraint
    /// currently being propagated.
    pub(crate) fn set_active_constraint(&mut self, constraint: Option<ConstraintId>) {
        self.active_constraint = constraint;
    }

    /// Queues a mutation without applying it. Mutations that target nothing
    /// are dropped.
    pub fn add(&mut self, mutation: Mutation) {
        if mutation.is_empty() {
            return;
        }
        let mut mutation = mutation;
        mutation.contributor = self.active_constraint;
        self.mutations.push(mutation);
    }

    /// Applies every pending mutation, remembering where the batch started.
    pub(crate) fn apply(&mut self, model: &mut Model) {
        self.prev_head = self.head;
        while self.head < self.mutations.len() {
            self.mutations[self.head].apply(model);
            self.head += 1;
        }
    }

    /// Undoes every applied mutation in LIFO order and clears the log.
    pub(crate) fn revert_all(&mut self, model: &mut Model) {
        while self.head > 0 {
            self.head -= 1;
            self.mutations[self.head].revert(model);
        }
        self.mutations.clear();
        self.prev_head = 0;
    }

    /// Undoes the mutations applied by the most recent `apply`, truncating
    /// the log back to where that batch started.
    pub(crate) fn revert_previous(&mut self, model: &mut Model) {
        while self.head > self.prev_head {
            self.head -= 1;
            self.mutations[self.head].revert(model);
            self.mutations.truncate(self.head);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::Mutator;
    use crate::solver::index::Probability;
    use crate::solver::model::Model;
    use crate::solver::problem::{DomainValue, Problem};
    use crate::solver::variable::Variable;

    fn two_value_problem() -> (Model, Variable<i64>) {
        let mut problem = Problem::new();
        let variable = problem.add_variable(
            "test",
            vec![
                DomainValue { priority: 0, probability: 1.0, value: 1 },
                DomainValue { priority: 0, probability: 0.5, value: 2 },
            ],
        );
        let model = problem.build();
        (model, variable)
    }

    #[test]
    fn apply_and_revert_bump_the_version() {
        let (mut model, variable) = two_value_problem();
        let mut mutator = Mutator::new();

        mutator.add(variable.domain(&model).exclude(&[0]));
        assert!(variable.domain(&model).is_unassigned());
        assert_eq!(variable.domain(&model).version(), 1);

        mutator.apply(&mut model);
        assert!(variable.domain(&model).is_assigned());
        assert_eq!(variable.domain(&model).version(), 2);

        mutator.revert_all(&mut model);
        assert!(variable.domain(&model).is_unassigned());
        assert_eq!(variable.domain(&model).version(), 3);
    }

    #[test]
    fn revert_all_restores_the_tracked_arrays() {
        let (mut model, variable) = two_value_problem();

        let before_available = variable.domain(&model).available_indices().to_vec();
        let before_probabilities: Vec<Probability> = before_available
            .iter()
            .map(|&i| variable.domain(&model).index_probability(i))
            .collect();

        let mut mutator = Mutator::new();
        mutator.add(variable.domain(&model).assign(1));
        mutator.add(variable.domain(&model).update_probability(0.25, &[1]));
        mutator.apply(&mut model);
        mutator.revert_all(&mut model);

        let domain = variable.domain(&model);
        assert_eq!(domain.available_indices(), before_available.as_slice());
        for (&i, &probability) in before_available.iter().zip(&before_probabilities) {
            assert_eq!(domain.index_probability(i), probability);
        }
        assert_eq!(domain.min_priority(), 0);
        assert_eq!(domain.sum_probability(), 1.5);
    }

    #[test]
    fn revert_previous_only_undoes_the_last_batch() {
        let (mut model, variable) = two_value_problem();
        let mut mutator = Mutator::new();

        mutator.add(variable.domain(&model).update_probability(0.5, &[0]));
        mutator.apply(&mut model);

        mutator.add(variable.domain(&model).exclude(&[1]));
        mutator.apply(&mut model);
        assert!(variable.domain(&model).is_assigned());

        mutator.revert_previous(&mut model);
        let domain = variable.domain(&model);
        assert!(domain.is_unassigned());
        assert_eq!(domain.index_probability(0), 0.5);

        mutator.revert_all(&mut model);
        assert_eq!(variable.domain(&model).index_probability(0), 1.0);
    }

    #[test]
    fn assign_then_revert_restores_the_available_indices() {
        let (mut model, variable) = two_value_problem();
        let mut mutator = Mutator::new();

        mutator.add(variable.domain(&model).assign(0));
        mutator.apply(&mut model);
        assert_eq!(variable.domain(&model).available_indices(), &[0]);

        mutator.revert_all(&mut model);
        assert_eq!(variable.domain(&model).available_indices(), &[0, 1]);
    }

    proptest! {
        /// Any batch of tightening mutations must revert to exactly the
        /// state it was applied on.
        #[test]
        fn apply_revert_round_trips(
            operations in prop::collection::vec((0usize..4, 0usize..4, 0.0f32..1.0), 1..12)
        ) {
            let mut problem = Problem::new();
            let variable = problem.add_variable_from_values("test", vec![10, 20, 30, 40]);
            let mut model = problem.build();

            let before_available = variable.domain(&model).available_indices().to_vec();
            let before_version = variable.domain(&model).version();

            let mut mutator = Mutator::new();
            for (kind, index, factor) in operations {
                let domain = variable.domain(&model);
                let mutation = match kind {
                    0 => domain.exclude(&[index]),
                    1 => domain.update_probability(factor, &[index]),
                    2 => domain.update_priority(1, &[index]),
                    _ => domain.assign(index),
                };
                mutator.add(mutation);
                mutator.apply(&mut model);
            }
            mutator.revert_all(&mut model);

            let domain = variable.domain(&model);
            prop_assert_eq!(domain.available_indices(), before_available.as_slice());
            prop_assert_eq!(domain.min_priority(), 0);
            for &i in domain.available_indices() {
                prop_assert_eq!(domain.index_probability(i), 1.0);
                prop_assert_eq!(domain.index_priority(i), 0);
            }
            prop_assert!(domain.version() > before_version);
        }
    }
}
