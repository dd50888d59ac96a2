use rand::rngs::StdRng;
use rand::Rng;

use crate::solver::domain::{Domain, DomainId};
use crate::solver::model::Model;

/// A strategy choosing the next domain to branch on.
///
/// Only unassigned, non-hidden domains are eligible; pickers iterate the
/// model in registration order so a fixed seed reproduces the same search.
pub trait DomainPicker {
    /// Called once per solve before the search starts.
    fn init(&mut self, _model: &Model) {}

    /// Selects the next domain, or `None` when no domain can be picked.
    fn next_domain(&mut self, model: &Model, rng: &mut StdRng) -> Option<DomainId>;
}

/// A strategy choosing the next index to try within a domain.
pub trait IndexPicker {
    /// Called once per solve before the search starts.
    fn init(&mut self, _model: &Model) {}

    /// Selects the next index, or `None` when no candidate index exists.
    fn next_index(&mut self, domain: &Domain<'_>, rng: &mut StdRng) -> Option<usize>;
}

/// Picks the domain with the fewest remaining indices, a fail-first rule.
/// Ties break towards the domain sharing constraints with the most other
/// unassigned domains, then towards registration order.
#[derive(Debug, Default)]
pub struct MinRemainingValuesPicker;

impl DomainPicker for MinRemainingValuesPicker {
    fn next_domain(&mut self, model: &Model, _rng: &mut StdRng) -> Option<DomainId> {
        let mut best: Option<(DomainId, usize, usize)> = None;
        for id in model.domain_ids() {
            let domain = model.domain(id);
            if !domain.can_be_picked() {
                continue;
            }

            let remaining = domain.available_indices().len();
            let relevant = domain.num_relevant_constraints();
            let improves = match best {
                None => true,
                Some((_, best_remaining, best_relevant)) => {
                    remaining < best_remaining
                        || (remaining == best_remaining && relevant > best_relevant)
                }
            };
            if improves {
                best = Some((id, remaining, relevant));
            }
        }
        best.map(|(id, _, _)| id)
    }
}

/// Picks the domain with minimal Shannon entropy.
#[derive(Debug, Default)]
pub struct MinEntropyDomainPicker;

impl DomainPicker for MinEntropyDomainPicker {
    fn next_domain(&mut self, model: &Model, _rng: &mut StdRng) -> Option<DomainId> {
        let mut min_entropy = f64::INFINITY;
        let mut next = None;
        for id in model.domain_ids() {
            let domain = model.domain(id);
            if !domain.can_be_picked() {
                continue;
            }

            let entropy = domain.entropy();
            if entropy < min_entropy {
                next = Some(id);
                min_entropy = entropy;
            }
        }
        next
    }
}

/// Picks the first eligible domain in registration order.
#[derive(Debug, Default)]
pub struct IndexDomainPicker;

impl DomainPicker for IndexDomainPicker {
    fn next_domain(&mut self, model: &Model, _rng: &mut StdRng) -> Option<DomainId> {
        model.domain_ids().find(|&id| model.domain(id).can_be_picked())
    }
}

/// Picks uniformly among the eligible domains.
#[derive(Debug, Default)]
pub struct RandomDomainPicker {
    eligible: Vec<DomainId>,
}

impl DomainPicker for RandomDomainPicker {
    fn next_domain(&mut self, model: &Model, rng: &mut StdRng) -> Option<DomainId> {
        self.eligible.clear();
        self.eligible
            .extend(model.domain_ids().filter(|&id| model.domain(id).can_be_picked()));
        if self.eligible.is_empty() {
            return None;
        }
        Some(self.eligible[rng.random_range(0..self.eligible.len())])
    }
}

/// Samples an index from the minimum priority tier according to the declared
/// probabilities, using a cumulative distribution over the tier.
#[derive(Debug, Default)]
pub struct ProbabilisticIndexPicker {
    /// Indices backing each entry of the cumulative distribution.
    cdf_index: Vec<usize>,
    /// Cumulative distribution over the minimum priority tier.
    cdf: Vec<f64>,
}

impl IndexPicker for ProbabilisticIndexPicker {
    fn init(&mut self, model: &Model) {
        let largest = model
            .domain_ids()
            .map(|id| model.domain(id).num_indices())
            .max()
            .unwrap_or(0);
        self.cdf_index = Vec::with_capacity(largest);
        self.cdf = Vec::with_capacity(largest);
    }

    fn next_index(&mut self, domain: &Domain<'_>, rng: &mut StdRng) -> Option<usize> {
        self.cdf_index.clear();
        self.cdf.clear();

        let min_priority = domain.min_priority();
        let mut cumulative = 0.0;
        for &i in domain.available_indices() {
            if domain.index_priority(i) != min_priority {
                continue;
            }
            cumulative += f64::from(domain.index_probability(i));
            self.cdf_index.push(i);
            self.cdf.push(cumulative);
        }

        if self.cdf.is_empty() {
            return None;
        }

        let sample = rng.random::<f64>() * cumulative;
        let mut position = 0;
        while position + 1 < self.cdf.len() && sample > self.cdf[position] {
            position += 1;
        }
        Some(self.cdf_index[position])
    }
}

/// Picks uniformly among the available indices, ignoring probability and
/// priority values.
#[derive(Debug, Default)]
pub struct RandomIndexPicker;

impl IndexPicker for RandomIndexPicker {
    fn next_index(&mut self, domain: &Domain<'_>, rng: &mut StdRng) -> Option<usize> {
        let available = domain.available_indices();
        if available.is_empty() {
            return None;
        }
        Some(available[rng.random_range(0..available.len())])
    }
}

/// Orders indices by how little they constrain neighbouring domains.
///
/// No concrete ordering policy has been settled on yet; picking through this
/// type panics.
#[derive(Debug, Default)]
pub struct LeastConstrainingValueIndexPicker;

impl IndexPicker for LeastConstrainingValueIndexPicker {
    fn next_index(&mut self, _domain: &Domain<'_>, _rng: &mut StdRng) -> Option<usize> {
        unimplemented!("least-constraining-value ordering has no policy yet")
    }
}
