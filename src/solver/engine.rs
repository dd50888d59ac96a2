use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::solver::domain::DomainId;
use crate::solver::events::{Events, SolverEvent};
use crate::solver::model::Model;
use crate::solver::mutation::Mutator;
use crate::solver::pickers::{
    DomainPicker, IndexDomainPicker, IndexPicker, MinEntropyDomainPicker,
    MinRemainingValuesPicker, ProbabilisticIndexPicker, RandomDomainPicker, RandomIndexPicker,
};
use crate::solver::propagator::Propagator;
use crate::solver::stats::SearchStats;

/// Searches a [`Model`] for total assignments satisfying every constraint.
///
/// The solver interleaves AC-3 style propagation with backtracking: it
/// propagates to a fix-point, picks an unassigned domain and an index within
/// it, assigns, and recurses; a contradiction rolls the transaction back and
/// excludes the tried index. Branching order is driven by the configured
/// pickers and the solver's seedable random generator.
///
/// Configuration is builder-style:
///
/// ```
/// use aleator::solver::engine::Solver;
/// use aleator::solver::events::SolverEvent;
///
/// let solver = Solver::new()
///     .with_seed(42)
///     .find_all_solutions()
///     .select_domains_by_min_entropy()
///     .on(SolverEvent::SolutionFound, |_model| println!("found one"));
/// ```
pub struct Solver {
    rng: StdRng,
    domain_picker: Box<dyn DomainPicker>,
    index_picker: Box<dyn IndexPicker>,
    max_solutions: i64,
    solutions_found: u64,
    propagator: Propagator,
    events: Events,
    stats: SearchStats,
}

impl Solver {
    /// Creates a solver with the default configuration: stop after the first
    /// solution, pick domains by minimum remaining values, pick indices
    /// probabilistically, and seed the generator from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            domain_picker: Box::new(MinRemainingValuesPicker),
            index_picker: Box::new(ProbabilisticIndexPicker::default()),
            max_solutions: 1,
            solutions_found: 0,
            propagator: Propagator::new(),
            events: Events::new(),
            stats: SearchStats::default(),
        }
    }

    /// Explicitly sets the random seed to allow reproducible runs.
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.rng = StdRng::seed_from_u64(seed as u64);
        self
    }

    /// Stops the solver after finding at most `n` solutions.
    pub fn find_n_solutions(mut self, n: u64) -> Self {
        self.max_solutions = n as i64;
        self
    }

    /// Searches for all solutions exhaustively.
    pub fn find_all_solutions(mut self) -> Self {
        self.max_solutions = -1;
        self
    }

    /// Sets the domain picker.
    pub fn select_domains_by(mut self, picker: impl DomainPicker + 'static) -> Self {
        self.domain_picker = Box::new(picker);
        self
    }

    /// Selects the next domain with the minimum number of remaining indices.
    pub fn select_domains_by_min_remaining_values(self) -> Self {
        self.select_domains_by(MinRemainingValuesPicker)
    }

    /// Selects the next domain by minimal Shannon entropy.
    pub fn select_domains_by_min_entropy(self) -> Self {
        self.select_domains_by(MinEntropyDomainPicker)
    }

    /// Selects the next domain in registration order.
    pub fn select_domains_by_index(self) -> Self {
        self.select_domains_by(IndexDomainPicker)
    }

    /// Selects the next domain at random.
    pub fn select_domains_at_random(self) -> Self {
        self.select_domains_by(RandomDomainPicker::default())
    }

    /// Sets the index picker.
    pub fn select_indices_by(mut self, picker: impl IndexPicker + 'static) -> Self {
        self.index_picker = Box::new(picker);
        self
    }

    /// Selects indices by chance according to their probabilities, within
    /// the group of indices holding the lowest priority value.
    pub fn select_indices_probabilistically(self) -> Self {
        self.select_indices_by(ProbabilisticIndexPicker::default())
    }

    /// Selects indices at random, ignoring probability and priority values.
    pub fn select_indices_at_random(self) -> Self {
        self.select_indices_by(RandomIndexPicker)
    }

    /// Hooks a callback to the given solver event. Callbacks fire
    /// synchronously, in subscription order.
    pub fn on(mut self, event: SolverEvent, callback: impl FnMut(&Model) + 'static) -> Self {
        self.events.subscribe(event, Box::new(callback));
        self
    }

    /// Emits solver progress through `tracing` while running.
    pub fn log_info(self) -> Self {
        let mut round: u64 = 0;
        self.on(SolverEvent::Start, |_| info!("starting"))
            .on(SolverEvent::Failure, |_| info!("failed finding a solution"))
            .on(SolverEvent::SolutionFound, |_| info!("solution found"))
            .on(SolverEvent::Select, move |_| {
                debug!(round, "next selection round");
                round += 1;
            })
            .on(SolverEvent::PropagateStart, |_| {
                debug!("start propagating constraints")
            })
    }

    /// Logs every registered constraint and its scope when solving starts.
    pub fn log_constraints(self) -> Self {
        self.on(SolverEvent::Start, |model| {
            for constraint_id in 0..model.num_constraints() {
                let scope: Vec<&str> = model
                    .constraint_scope(constraint_id)
                    .iter()
                    .map(|&id| model.domain(id).name())
                    .collect();
                info!(
                    id = constraint_id,
                    name = model.constraint_name(constraint_id),
                    scope = %scope.join(" "),
                    "constraint"
                );
            }
        })
    }

    /// The statistics gathered by the most recent [`Solver::solve`] call.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Runs the solving algorithm on the model and returns whether a
    /// solution could be found. The model is updated to reflect the found
    /// solution; when none is found, every mutation is reverted and the
    /// model is left as it was before the call.
    pub fn solve(&mut self, model: &mut Model) -> bool {
        self.solutions_found = 0;
        self.stats.reset();
        self.events.publish(SolverEvent::Start, model);

        self.domain_picker.init(model);
        self.index_picker.init(model);

        let mut initial = Mutator::new();
        let seeds: Vec<DomainId> = model.domain_ids().collect();
        let success = self.propagate(model, &mut initial, seeds);

        if success {
            self.events.publish(SolverEvent::SearchStart, model);
            self.select_next(0, model);
        }

        let has_solutions = self.solutions_found > 0;
        if !has_solutions {
            self.events.publish(SolverEvent::Failure, model);
            initial.revert_all(model);
        }

        self.stats.solutions_found = self.solutions_found;
        self.events.publish(SolverEvent::Finished, model);
        has_solutions
    }

    fn select_next(&mut self, level: usize, model: &mut Model) -> bool {
        self.events.publish(SolverEvent::Select, model);
        self.stats.nodes_visited += 1;

        if model.is_solved() {
            self.solutions_found += 1;
            self.events.publish(SolverEvent::SolutionFound, model);
            if self.max_solutions > 0 && self.solutions_found == self.max_solutions as u64 {
                return true;
            }
        }

        let Some(domain) = self.domain_picker.next_domain(model, &mut self.rng) else {
            return false;
        };

        let mut select = Mutator::new();
        loop {
            let picked = self
                .index_picker
                .next_index(&model.domain(domain), &mut self.rng);
            let Some(index) = picked else {
                select.revert_all(model);
                return false;
            };
            debug!(level, domain = model.domain(domain).name(), index, "assigning");

            select.add(model.domain(domain).assign(index));
            select.apply(model);

            let mut propagated = Mutator::new();
            let success = self.propagate(model, &mut propagated, [domain]);

            if success && self.select_next(level + 1, model) {
                return true;
            }

            self.stats.backtracks += 1;
            propagated.revert_all(model);
            select.revert_previous(model);
            select.add(model.domain(domain).exclude(&[index]));
            select.apply(model);
        }
    }

    fn propagate(
        &mut self,
        model: &mut Model,
        mutator: &mut Mutator,
        seeds: impl IntoIterator<Item = DomainId>,
    ) -> bool {
        self.events.publish(SolverEvent::PropagateStart, model);
        self.propagator
            .propagate(model, mutator, seeds, &mut self.stats)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
