use crate::solver::index::{Priority, Probability};
use crate::solver::model::Model;
use crate::solver::mutation::Mutation;

/// Identifies a single domain inside a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub(crate) usize);

/// A read view of one variable's domain.
///
/// Use the mutator functions to create [`Mutation`] instances describing
/// changes to this domain; nothing here mutates the model directly.
#[derive(Clone, Copy)]
pub struct Domain<'m> {
    pub(crate) model: &'m Model,
    pub(crate) id: DomainId,
}

impl<'m> Domain<'m> {
    pub fn id(&self) -> DomainId {
        self.id
    }

    pub fn name(&self) -> &'m str {
        self.model.name(self.id)
    }

    pub fn num_indices(&self) -> usize {
        self.model.num_indices_of(self.id)
    }

    /// Creates a mutation that assigns the given index to this domain by
    /// excluding every other available index. An out-of-range index
    /// degenerates to [`Domain::contradict`].
    pub fn assign(&self, index: usize) -> Mutation {
        if index >= self.num_indices() {
            return self.contradict();
        }

        let mut buffer = self.model.index_buffer();
        buffer.clear();
        buffer.extend(
            self.available_indices()
                .iter()
                .copied()
                .filter(|&available| available != index),
        );
        self.update(0.0, 0, buffer.as_slice())
    }

    /// Creates a mutation that excludes the given indices from this domain.
    pub fn exclude(&self, indices: &[usize]) -> Mutation {
        self.update(0.0, 0, indices)
    }

    /// Creates a mutation that excludes all available indices.
    pub fn contradict(&self) -> Mutation {
        self.exclude(self.available_indices())
    }

    /// Creates a mutation that raises the priority of the given indices.
    pub fn update_priority(&self, delta: Priority, indices: &[usize]) -> Mutation {
        self.update(1.0, delta, indices)
    }

    /// Creates a mutation that lowers the probability of the given indices.
    pub fn update_probability(&self, factor: Probability, indices: &[usize]) -> Mutation {
        self.update(factor, 0, indices)
    }

    /// Creates a mutation that updates the given indices with a probability
    /// factor and a priority delta. An empty index list yields the mutation
    /// that changes nothing.
    pub fn update(&self, factor: Probability, delta: Priority, indices: &[usize]) -> Mutation {
        if indices.is_empty() {
            return Mutation::none();
        }
        Mutation::new(self.id, indices.to_vec(), factor, delta)
    }

    /// Whether this domain is assigned exactly one index.
    pub fn is_assigned(&self) -> bool {
        self.available_indices().len() == 1
    }

    /// Whether this domain allows a choice between more than one index.
    pub fn is_unassigned(&self) -> bool {
        self.available_indices().len() > 1
    }

    /// Whether this domain has no indices available.
    pub fn is_in_contradiction(&self) -> bool {
        self.available_indices().is_empty()
    }

    /// Whether a picker may branch on this domain: unassigned and not hidden.
    pub fn can_be_picked(&self) -> bool {
        self.is_unassigned() && !self.is_hidden()
    }

    pub fn is_hidden(&self) -> bool {
        self.model.is_hidden(self.id)
    }

    /// The indices that are not banned, in ascending order.
    pub fn available_indices(&self) -> &'m [usize] {
        self.model.available_indices(self.id)
    }

    pub fn index_priority(&self, index: usize) -> Priority {
        self.model.index(self.id, index).priority()
    }

    pub fn index_probability(&self, index: usize) -> Probability {
        self.model.index(self.id, index).probability()
    }

    /// The smallest priority among the available indices, or `Priority::MAX`
    /// when none are available.
    pub fn min_priority(&self) -> Priority {
        self.model.min_priority(self.id)
    }

    /// The summed probability of the available indices in the minimum
    /// priority tier.
    pub fn sum_probability(&self) -> Probability {
        self.model.sum_probability(self.id)
    }

    /// The Shannon entropy over the minimum priority tier, renormalized by
    /// [`Domain::sum_probability`]. Negative infinity for a domain in
    /// contradiction.
    pub fn entropy(&self) -> f64 {
        self.model.entropy(self.id)
    }

    /// A counter that strictly increases every time this domain is updated,
    /// used to detect whether propagation affected it.
    pub fn version(&self) -> u64 {
        self.model.version(self.id)
    }

    /// Counts the constraints in which this domain shares scope with at
    /// least one other unassigned domain. Serves as a tie-breaker when
    /// picking the most constrained domain.
    pub fn num_relevant_constraints(&self) -> usize {
        self.model.num_relevant_constraints(self.id)
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::problem::{as_domain_values, DomainValue, Problem};

    #[test]
    fn empty_domain_is_in_contradiction() {
        let mut problem = Problem::new();
        let variable = problem.add_variable_from_values::<i64>("test", vec![]);
        let model = problem.build();

        let domain = variable.domain(&model);
        assert!(domain.is_in_contradiction());
        assert!(!domain.is_assigned());
        assert!(!domain.is_unassigned());
    }

    #[test]
    fn singleton_domain_is_assigned() {
        let mut problem = Problem::new();
        let variable = problem.add_variable_from_values("test", vec![1]);
        let model = problem.build();

        let domain = variable.domain(&model);
        assert!(!domain.is_in_contradiction());
        assert!(domain.is_assigned());
        assert!(!domain.is_unassigned());
    }

    #[test]
    fn wider_domain_is_unassigned() {
        let mut problem = Problem::new();
        let variable = problem.add_variable_from_values("test", vec![1, 2]);
        let model = problem.build();

        let domain = variable.domain(&model);
        assert!(!domain.is_in_contradiction());
        assert!(!domain.is_assigned());
        assert!(domain.is_unassigned());
    }

    #[test]
    fn all_zero_probabilities_contradict() {
        let mut problem = Problem::new();
        let variable = problem.add_variable(
            "test",
            vec![
                DomainValue { priority: 0, probability: 0.0, value: 1 },
                DomainValue { priority: 0, probability: 0.0, value: 2 },
            ],
        );
        let model = problem.build();

        let domain = variable.domain(&model);
        assert!(domain.is_in_contradiction());
        assert!(!domain.is_assigned());
        assert!(!domain.is_unassigned());
    }

    #[test]
    fn entropy_and_min_priority_follow_the_lowest_tier() {
        struct Case {
            values: Vec<DomainValue<i64>>,
            expected_entropy: f64,
            expected_min_priority: u32,
        }

        fn weighted(pairs: &[(f32, u32)]) -> Vec<DomainValue<i64>> {
            pairs
                .iter()
                .enumerate()
                .map(|(i, &(probability, priority))| DomainValue {
                    priority,
                    probability,
                    value: i as i64,
                })
                .collect()
        }

        let cases = vec![
            Case {
                values: vec![],
                expected_entropy: f64::NEG_INFINITY,
                expected_min_priority: u32::MAX,
            },
            Case {
                values: as_domain_values(vec![1]),
                expected_entropy: 0.0,
                expected_min_priority: 0,
            },
            Case {
                values: as_domain_values(vec![1, 2]),
                expected_entropy: 1.0,
                expected_min_priority: 0,
            },
            Case {
                values: weighted(&[(1.0, 1), (1.0, 1)]),
                expected_entropy: 1.0,
                expected_min_priority: 1,
            },
            Case {
                values: weighted(&[(4.0, 0), (1.0, 0)]),
                expected_entropy: 0.7219280948,
                expected_min_priority: 0,
            },
            Case {
                values: as_domain_values(vec![1, 2, 3, 4]),
                expected_entropy: 2.0,
                expected_min_priority: 0,
            },
            Case {
                values: weighted(&[(1.0, 0), (1.0, 1)]),
                expected_entropy: 0.0,
                expected_min_priority: 0,
            },
            Case {
                values: weighted(&[(1.0, 0), (1.0, 0), (1.0, 1)]),
                expected_entropy: 1.0,
                expected_min_priority: 0,
            },
        ];

        for case in cases {
            let mut problem = Problem::new();
            let variable = problem.add_variable("test", case.values);
            let model = problem.build();
            let domain = variable.domain(&model);

            assert!(
                (domain.entropy() - case.expected_entropy).abs() < 1e-10
                    || domain.entropy() == case.expected_entropy,
                "expected entropy {}, got {}",
                case.expected_entropy,
                domain.entropy()
            );
            assert_eq!(domain.min_priority(), case.expected_min_priority);
        }
    }
}
