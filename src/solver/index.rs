use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::solver::constraint::ConstraintId;

/// A floating point weight indicating the chance that an index will be picked.
pub type Probability = f32;

/// A tier with which an index will be picked.
/// Lower values precede higher values, 0 being the most preferred.
pub type Priority = u32;

/// Probabilities closer to zero than this are treated as zero.
pub(crate) const ZERO_PROBABILITY: f64 = 1e-10;

/// The key of a per-index modifier: `None` is the base entry installed when
/// the index is created, `Some(id)` the contribution of a constraint.
pub(crate) type Contributor = Option<ConstraintId>;

/// Immutable probability and priority state of a single index in a domain.
///
/// The base entry is fixed at creation; constraints layer their own
/// modifiers on top of it. The aggregates are kept alongside the modifier
/// maps so reading them is free.
#[derive(Debug)]
pub(crate) struct Index {
    probability_modifiers: Rc<BTreeMap<Contributor, Probability>>,
    priority_modifiers: Rc<BTreeMap<Contributor, Priority>>,

    /// Product of the probability modifiers.
    probability: Probability,
    /// Sum of the priority modifiers.
    priority: Priority,
    /// Whether the index is currently banned.
    banned: bool,
}

impl Index {
    pub(crate) fn probability(&self) -> Probability {
        self.probability
    }

    pub(crate) fn priority(&self) -> Priority {
        self.priority
    }

    pub(crate) fn is_banned(&self) -> bool {
        self.banned
    }
}

fn pack(probability: Probability, priority: Priority) -> u64 {
    (u64::from(probability.to_bits()) << 32) | u64::from(priority)
}

/// Creates and interns indices for one model.
///
/// Indices holding only their base pair are deduplicated by the packed
/// (probability, priority) key, so large uniform domains share storage.
/// Index identity is never significant, only the values it carries.
#[derive(Debug)]
pub(crate) struct IndexFactory {
    indices: HashMap<u64, Rc<Index>>,
    banned: Rc<Index>,
}

impl IndexFactory {
    pub(crate) fn new() -> Self {
        Self {
            indices: HashMap::new(),
            banned: Rc::new(Index {
                probability_modifiers: Rc::new(BTreeMap::new()),
                priority_modifiers: Rc::new(BTreeMap::new()),
                probability: 0.0,
                priority: Priority::MAX,
                banned: true,
            }),
        }
    }

    /// Returns an index holding the given base pair.
    /// Fails closed: a probability within [`ZERO_PROBABILITY`] of zero yields
    /// the shared banned sentinel.
    pub(crate) fn create(&mut self, probability: Probability, priority: Priority) -> Rc<Index> {
        if f64::from(probability).abs() < ZERO_PROBABILITY {
            return Rc::clone(&self.banned);
        }

        let key = pack(probability, priority);
        Rc::clone(self.indices.entry(key).or_insert_with(|| {
            Rc::new(Index {
                probability_modifiers: Rc::new(BTreeMap::from([(None, probability)])),
                priority_modifiers: Rc::new(BTreeMap::from([(None, priority)])),
                probability,
                priority,
                banned: false,
            })
        }))
    }

    /// Tightens `index` with the contribution of `contributor`, returning the
    /// replacement index or `None` when nothing changed.
    ///
    /// A contributor can only lower its probability factor and raise its
    /// priority delta; weaker contributions than the ones already recorded
    /// leave the index untouched. A banned index is never adjusted.
    pub(crate) fn adjust(
        &self,
        index: &Rc<Index>,
        contributor: Contributor,
        probability: Probability,
        priority: Priority,
    ) -> Option<Rc<Index>> {
        if index.banned {
            return None;
        }

        if probability == 0.0 {
            return Some(Rc::clone(&self.banned));
        }

        let current_probability = index
            .probability_modifiers
            .get(&contributor)
            .copied()
            .unwrap_or(1.0);
        let lowers_probability = probability < current_probability;

        let current_priority = index
            .priority_modifiers
            .get(&contributor)
            .copied()
            .unwrap_or(0);
        let raises_priority = priority > current_priority;

        if !lowers_probability && !raises_priority {
            return None;
        }

        let mut adjusted = Index {
            probability_modifiers: Rc::clone(&index.probability_modifiers),
            priority_modifiers: Rc::clone(&index.priority_modifiers),
            probability: index.probability,
            priority: index.priority,
            banned: false,
        };

        if lowers_probability {
            let mut modifiers = (*index.probability_modifiers).clone();
            modifiers.insert(contributor, probability);
            adjusted.probability = modifiers.values().product();
            adjusted.banned = f64::from(adjusted.probability).abs() < ZERO_PROBABILITY;
            adjusted.probability_modifiers = Rc::new(modifiers);
        }

        if raises_priority {
            let mut modifiers = (*index.priority_modifiers).clone();
            modifiers.insert(contributor, priority);
            adjusted.priority = modifiers
                .values()
                .fold(0, |sum, delta| sum.saturating_add(*delta));
            adjusted.priority_modifiers = Rc::new(modifiers);
        }

        Some(Rc::new(adjusted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_interns_equal_base_pairs() {
        let mut factory = IndexFactory::new();
        let first = factory.create(1.0, 0);
        let second = factory.create(1.0, 0);
        let third = factory.create(2.0, 0);

        assert!(Rc::ptr_eq(&first, &second));
        assert!(!Rc::ptr_eq(&first, &third));
    }

    #[test]
    fn create_holds_the_base_pair() {
        let mut factory = IndexFactory::new();
        let index = factory.create(1.0, 0);

        assert_eq!(index.probability(), 1.0);
        assert_eq!(index.priority(), 0);
        assert!(!index.is_banned());
    }

    #[test]
    fn create_bans_vanishing_probabilities() {
        let mut factory = IndexFactory::new();
        let index = factory.create(1e-12, 3);

        assert!(index.is_banned());
        assert_eq!(index.probability(), 0.0);
    }

    #[test]
    fn adjust_lowers_probability_but_never_raises_it() {
        let mut factory = IndexFactory::new();
        let index = factory.create(1.0, 0);

        let lowered = factory.adjust(&index, None, 0.5, 0).unwrap();
        assert_eq!(lowered.probability(), 0.5);

        assert!(factory.adjust(&lowered, None, 1.0, 0).is_none());
    }

    #[test]
    fn adjust_raises_priority_but_never_lowers_it() {
        let mut factory = IndexFactory::new();
        let index = factory.create(1.0, 0);

        let raised = factory.adjust(&index, None, 1.0, 1).unwrap();
        assert_eq!(raised.priority(), 1);

        assert!(factory.adjust(&raised, None, 1.0, 0).is_none());
    }

    #[test]
    fn adjust_with_the_identity_contribution_is_a_no_op() {
        let mut factory = IndexFactory::new();
        let index = factory.create(0.8, 2);

        assert!(factory.adjust(&index, Some(0), 1.0, 0).is_none());
    }

    #[test]
    fn adjust_with_zero_factor_bans() {
        let mut factory = IndexFactory::new();
        let index = factory.create(1.0, 0);

        let banned = factory.adjust(&index, Some(0), 0.0, 0).unwrap();
        assert!(banned.is_banned());
        assert!(factory.adjust(&banned, Some(1), 0.5, 0).is_none());
    }

    #[test]
    fn adjust_multiplies_factors_across_contributors() {
        let mut factory = IndexFactory::new();
        let index = factory.create(0.5, 0);

        let once = factory.adjust(&index, Some(0), 0.5, 0).unwrap();
        let twice = factory.adjust(&once, Some(1), 0.5, 1).unwrap();

        assert!((twice.probability() - 0.125).abs() < 1e-6);
        assert_eq!(twice.priority(), 1);
    }

    #[test]
    fn adjust_bans_once_the_product_vanishes() {
        let mut factory = IndexFactory::new();
        let index = factory.create(1e-6, 0);

        let shrunk = factory.adjust(&index, Some(0), 1e-6, 0).unwrap();
        assert!(shrunk.is_banned());
    }
}
