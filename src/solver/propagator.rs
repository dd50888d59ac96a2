use tracing::debug;

use crate::solver::domain::DomainId;
use crate::solver::model::Model;
use crate::solver::mutation::Mutator;
use crate::solver::stats::SearchStats;
use crate::solver::work_list::WorkList;

/// Fixed-points the constraint graph over a worklist of changed domains.
///
/// Dequeued domains have their constraints propagated in registration
/// order; the mutations those constraints submit are applied in one batch,
/// and every scope member whose version advanced is scheduled again. A
/// domain ending up in contradiction aborts the run.
#[derive(Debug)]
pub(crate) struct Propagator {
    queue: WorkList<DomainId>,
    targets: Vec<DomainId>,
    versions: Vec<u64>,
}

impl Propagator {
    pub(crate) fn new() -> Self {
        Self {
            queue: WorkList::new(),
            targets: Vec::new(),
            versions: Vec::new(),
        }
    }

    /// Runs to a fix-point from the given seed domains. Returns `false` when
    /// a contradiction was found; the queue is then emptied and the caller
    /// is expected to revert `mutator`.
    pub(crate) fn propagate(
        &mut self,
        model: &mut Model,
        mutator: &mut Mutator,
        seeds: impl IntoIterator<Item = DomainId>,
        stats: &mut SearchStats,
    ) -> bool {
        for seed in seeds {
            self.queue.push_back(seed);
        }

        while let Some(selected) = self.queue.pop_front() {
            stats.propagation_rounds += 1;
            self.targets.clear();

            for position in 0..model.constraints_for(selected).len() {
                let constraint_id = model.constraints_for(selected)[position];
                mutator.set_active_constraint(Some(constraint_id));
                model
                    .constraint(constraint_id)
                    .constraint
                    .propagate(model, mutator);
                stats.record_revision(constraint_id);

                for &target in &model.constraint(constraint_id).scope {
                    if !self.targets.contains(&target) {
                        self.targets.push(target);
                    }
                }
            }
            mutator.set_active_constraint(None);

            self.versions.clear();
            self.versions
                .extend(self.targets.iter().map(|&target| model.domain(target).version()));

            mutator.apply(model);

            for (position, &target) in self.targets.iter().enumerate() {
                let domain = model.domain(target);
                if domain.is_in_contradiction() {
                    debug!(domain = domain.name(), "contradiction, emptying queue");
                    self.queue.reset();
                    return false;
                }
                if domain.version() > self.versions[position] {
                    self.queue.push_back(target);
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::Propagator;
    use crate::solver::constraint::{ids_of, Constraint};
    use crate::solver::domain::DomainId;
    use crate::solver::model::Model;
    use crate::solver::mutation::Mutator;
    use crate::solver::problem::Problem;
    use crate::solver::stats::SearchStats;
    use crate::solver::variable::Variable;

    struct Equals {
        a: Variable<i64>,
        b: Variable<i64>,
    }

    impl Constraint for Equals {
        fn scope(&self) -> Vec<DomainId> {
            ids_of(&[&self.a, &self.b])
        }

        fn propagate(&self, model: &Model, mutator: &mut Mutator) {
            if let Ok(value) = self.a.assigned_value(model) {
                mutator.add(self.b.assign_by_value(model, &value));
            }
            if let Ok(value) = self.b.assigned_value(model) {
                mutator.add(self.a.assign_by_value(model, &value));
            }
        }
    }

    struct Impossible {
        a: Variable<i64>,
    }

    impl Constraint for Impossible {
        fn scope(&self) -> Vec<DomainId> {
            ids_of(&[&self.a])
        }

        fn propagate(&self, model: &Model, mutator: &mut Mutator) {
            mutator.add(self.a.domain(model).contradict());
        }
    }

    #[test]
    fn propagation_reaches_a_fix_point_across_constraints() {
        let mut problem = Problem::new();
        let a = problem.add_variable_from_values("a", vec![1]);
        let b = problem.add_variable_from_values("b", vec![1, 2]);
        let c = problem.add_variable_from_values("c", vec![1, 2, 3]);
        problem
            .add_constraint(Equals { a: a.clone(), b: b.clone() })
            .unwrap();
        problem
            .add_constraint(Equals { a: b.clone(), b: c.clone() })
            .unwrap();
        let mut model = problem.build();

        let mut propagator = Propagator::new();
        let mut mutator = Mutator::new();
        let mut stats = SearchStats::default();
        let seeds: Vec<DomainId> = model.domain_ids().collect();

        assert!(propagator.propagate(&mut model, &mut mutator, seeds, &mut stats));
        assert_eq!(b.assigned_value(&model).unwrap(), 1);
        assert_eq!(c.assigned_value(&model).unwrap(), 1);
    }

    #[test]
    fn a_contradiction_reports_failure() {
        let mut problem = Problem::new();
        let a = problem.add_variable_from_values("a", vec![1, 2]);
        problem.add_constraint(Impossible { a: a.clone() }).unwrap();
        let mut model = problem.build();

        let mut propagator = Propagator::new();
        let mut mutator = Mutator::new();
        let mut stats = SearchStats::default();
        let seeds: Vec<DomainId> = model.domain_ids().collect();

        assert!(!propagator.propagate(&mut model, &mut mutator, seeds, &mut stats));
        assert!(a.domain(&model).is_in_contradiction());

        mutator.revert_all(&mut model);
        assert_eq!(a.domain(&model).available_indices(), &[0, 1]);
    }
}
