use std::collections::{BTreeMap, HashMap};

use crate::consensus::worker::Label;

/// Label sequences keyed by worker identity
pub type Submissions = BTreeMap<String, Vec<Label>>;

/// Strategy for folding several workers' label sequences into one answer.
///
/// Implementations must be pure: the same submissions always produce the same
/// output, regardless of the order they were received in.
pub trait Consensus: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Consolidate `submissions` into a single label sequence. All sequences
    /// are expected to have the same length; an empty input yields an empty
    /// output.
    fn aggregate(&self, submissions: &Submissions) -> Vec<Label>;
}

/// Per-position plurality vote.
///
/// At each position the most frequent label wins. When several labels share
/// the highest count, the smallest one (by `Label`'s ordering) wins, so the
/// result depends only on the multiset of votes at that position.
#[derive(Debug, Default, Clone, Copy)]
pub struct MajorityVote;

impl MajorityVote {
    fn vote<'a>(votes: impl Iterator<Item = &'a Label>) -> Option<Label> {
        let mut counts: HashMap<&Label, usize> = HashMap::new();
        for label in votes {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)))
            .map(|(label, _)| label.clone())
    }
}

impl Consensus for MajorityVote {
    fn name(&self) -> &'static str {
        "majority"
    }

    fn aggregate(&self, submissions: &Submissions) -> Vec<Label> {
        let len = match submissions.values().next() {
            Some(first) => first.len(),
            None => return Vec::new(),
        };

        (0..len)
            .filter_map(|i| Self::vote(submissions.values().filter_map(|labels| labels.get(i))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Label> {
        values.iter().copied().map(Label::from).collect()
    }

    fn submissions(entries: &[(&str, &[i64])]) -> Submissions {
        entries
            .iter()
            .map(|(id, labels)| (id.to_string(), ints(labels)))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(MajorityVote.aggregate(&Submissions::new()).is_empty());
    }

    #[test]
    fn per_position_majority() {
        let input = submissions(&[("a", &[1, 1]), ("b", &[1, 2]), ("c", &[1, 2])]);
        assert_eq!(MajorityVote.aggregate(&input), ints(&[1, 2]));
    }

    #[test]
    fn single_submission_is_returned_as_is() {
        let input = submissions(&[("only", &[4, 5, 6])]);
        assert_eq!(MajorityVote.aggregate(&input), ints(&[4, 5, 6]));
    }

    #[test]
    fn ties_pick_smallest_label() {
        let input = submissions(&[("a", &[9, 3]), ("b", &[2, 3]), ("c", &[5, 7]), ("d", &[2, 7])]);
        // position 0: 9,2,5,2 -> 2 wins outright; position 1: 3,3,7,7 -> tie, 3 wins
        assert_eq!(MajorityVote.aggregate(&input), ints(&[2, 3]));
    }

    #[test]
    fn tie_break_ignores_identity_order() {
        let forward = submissions(&[("a", &[1]), ("b", &[2])]);
        let reversed = submissions(&[("a", &[2]), ("b", &[1])]);
        assert_eq!(MajorityVote.aggregate(&forward), MajorityVote.aggregate(&reversed));
        assert_eq!(MajorityVote.aggregate(&forward), ints(&[1]));
    }

    #[test]
    fn mixed_label_kinds() {
        let mut input = Submissions::new();
        input.insert("a".into(), vec![Label::from("cat"), Label::from(0)]);
        input.insert("b".into(), vec![Label::from("dog"), Label::from("none")]);
        input.insert("c".into(), vec![Label::from("cat"), Label::from("none")]);
        assert_eq!(
            MajorityVote.aggregate(&input),
            vec![Label::from("cat"), Label::from("none")]
        );
    }

    #[test]
    fn short_sequences_do_not_panic() {
        let input = submissions(&[("a", &[1, 2, 3]), ("b", &[1]), ("c", &[1, 3])]);
        assert_eq!(MajorityVote.aggregate(&input), ints(&[1, 2, 3]));
    }

    #[test]
    fn rerun_is_idempotent() {
        let input = submissions(&[("a", &[1, 0, 1]), ("b", &[0, 0, 1]), ("c", &[1, 1, 0])]);
        let first = MajorityVote.aggregate(&input);
        assert_eq!(first, MajorityVote.aggregate(&input));
        assert_eq!(first, ints(&[1, 0, 1]));
    }
}
