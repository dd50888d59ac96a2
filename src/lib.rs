//! Aleator is a solver for finite-domain constraint satisfaction problems
//! driven by probabilistic constraint propagation with backtracking search.
//!
//! A problem is declared as a set of typed variables, each holding a finite
//! set of candidate values annotated with a probability weight and a
//! priority tier, plus constraints restricting the joint assignment. The
//! solver propagates constraints to a fix-point, branches on the remaining
//! choices, and samples among equivalent branches according to the declared
//! probabilities, preferring lower priority tiers.
//!
//! # Core Concepts
//!
//! - **[`Problem`]**: the builder collecting variables and constraints;
//!   [`Problem::build`] freezes them into a [`Model`].
//! - **[`Variable`]**: a typed handle over one domain, used inside
//!   constraints to read state and emit [`Mutation`]s in value space.
//! - **[`Constraint`]**: a trait exposing the domains it watches and a
//!   `propagate` hook submitting tightening mutations through a
//!   [`Mutator`].
//! - **[`Solver`]**: the engine; configured builder-style with a seed,
//!   solution limits, picking strategies and event callbacks.
//!
//! [`Problem`]: solver::problem::Problem
//! [`Problem::build`]: solver::problem::Problem::build
//! [`Model`]: solver::model::Model
//! [`Variable`]: solver::variable::Variable
//! [`Constraint`]: solver::constraint::Constraint
//! [`Mutation`]: solver::mutation::Mutation
//! [`Mutator`]: solver::mutation::Mutator
//! [`Solver`]: solver::engine::Solver
//!
//! # Example: `?A > ?B`
//!
//! Two variables over `1..=3` and a single constraint requiring `A > B`.
//! Propagation alone narrows `A` to `{2, 3}` and `B` to `{1, 2}`; the
//! search finishes the job.
//!
//! ```
//! use aleator::solver::constraint::{ids_of, Constraint};
//! use aleator::solver::domain::DomainId;
//! use aleator::solver::engine::Solver;
//! use aleator::solver::model::Model;
//! use aleator::solver::mutation::Mutator;
//! use aleator::solver::problem::Problem;
//! use aleator::solver::variable::Variable;
//!
//! struct LargerThan {
//!     a: Variable<i64>,
//!     b: Variable<i64>,
//! }
//!
//! impl Constraint for LargerThan {
//!     fn scope(&self) -> Vec<DomainId> {
//!         ids_of(&[&self.a, &self.b])
//!     }
//!
//!     fn propagate(&self, model: &Model, mutator: &mut Mutator) {
//!         let max_a = self.a.available_values(model).iter().copied().max();
//!         let min_b = self.b.available_values(model).iter().copied().min();
//!         if let Some(min_b) = min_b {
//!             mutator.add(self.a.exclude_by(model, |&value| value <= min_b));
//!         }
//!         if let Some(max_a) = max_a {
//!             mutator.add(self.b.exclude_by(model, |&value| value >= max_a));
//!         }
//!     }
//! }
//!
//! let mut problem = Problem::new();
//! let a = problem.add_variable_from_values("A", vec![1, 2, 3]);
//! let b = problem.add_variable_from_values("B", vec![1, 2, 3]);
//! problem
//!     .add_constraint(LargerThan { a: a.clone(), b: b.clone() })
//!     .unwrap();
//! let mut model = problem.build();
//!
//! let mut solver = Solver::new().with_seed(0);
//! assert!(solver.solve(&mut model));
//!
//! let a_value = a.assigned_value(&model).unwrap();
//! let b_value = b.assigned_value(&model).unwrap();
//! assert!(a_value > b_value);
//! ```
pub mod error;
pub mod solver;
