use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::Topic;
use crate::error::SelectError;

/// Outcome of one topic draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub topic: Topic,
    /// Every topic had been used; the ledger was cleared before drawing.
    pub reset: bool,
}

/// Draw an unused topic uniformly at random.
///
/// When every topic has been used, `used` is cleared and the draw is taken
/// from the whole store. The drawn topic is never added to `used` here; the
/// publisher marks it after a successful delivery.
pub fn select_topic<R: Rng + ?Sized>(
    all: &[Topic],
    used: &mut BTreeSet<Topic>,
    rng: &mut R,
) -> Result<Selection, SelectError> {
    if all.is_empty() {
        return Err(SelectError::EmptyTopicStore);
    }

    let available: Vec<&Topic> = all.iter().filter(|t| !used.contains(*t)).collect();

    if let Some(topic) = available.choose(rng) {
        return Ok(Selection {
            topic: (*topic).clone(),
            reset: false,
        });
    }

    used.clear();
    let topic = all
        .choose(rng)
        .cloned()
        .ok_or(SelectError::EmptyTopicStore)?;
    Ok(Selection { topic, reset: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn topics(names: &[&str]) -> Vec<Topic> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_available_topic_is_chosen() {
        let all = topics(&["beef", "freestyle"]);
        let mut used = BTreeSet::from(["beef".to_string()]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let sel = select_topic(&all, &mut used, &mut rng).unwrap();
            assert_eq!(sel.topic, "freestyle");
            assert!(!sel.reset);
        }
        assert_eq!(used.len(), 1);
    }

    #[test]
    fn exhaustion_clears_ledger_before_drawing() {
        let all = topics(&["beef", "freestyle"]);
        let mut seen = BTreeSet::new();
        for seed in 0..64 {
            let mut used: BTreeSet<Topic> = all.iter().cloned().collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let sel = select_topic(&all, &mut used, &mut rng).unwrap();
            assert!(sel.reset);
            assert!(used.is_empty(), "reset must not pre-mark the new pick");
            assert!(all.contains(&sel.topic));
            seen.insert(sel.topic);
        }
        assert_eq!(seen.len(), 2, "both topics should be reachable after reset");
    }

    #[test]
    fn empty_store_is_an_error() {
        let mut used = BTreeSet::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            select_topic(&[], &mut used, &mut rng),
            Err(SelectError::EmptyTopicStore)
        ));
    }

    #[test]
    fn full_rotation_before_any_repeat() {
        let all = topics(&["a", "b", "c", "d", "e"]);
        let mut used = BTreeSet::new();
        let mut rng = StdRng::seed_from_u64(7);

        for rotation in 0..3 {
            let mut cycle = BTreeSet::new();
            for i in 0..all.len() {
                let sel = select_topic(&all, &mut used, &mut rng).unwrap();
                assert_eq!(sel.reset, rotation > 0 && i == 0);
                assert!(cycle.insert(sel.topic.clone()), "repeat within a rotation");
                used.insert(sel.topic);
            }
            assert_eq!(used.len(), all.len());
        }
    }

    #[test]
    fn stale_used_entries_do_not_block_selection() {
        // A topic removed from the store may linger in the ledger.
        let all = topics(&["a"]);
        let mut used = BTreeSet::from(["gone".to_string()]);
        let mut rng = StdRng::seed_from_u64(3);
        let sel = select_topic(&all, &mut used, &mut rng).unwrap();
        assert_eq!(sel.topic, "a");
        assert!(!sel.reset);
    }
}
