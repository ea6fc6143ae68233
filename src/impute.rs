//! Constituent identifier imputation over Title partitions.
//!
//! Records sharing a `Title` form one group, ordered by ascending `Object ID`
//! (missing ids first, ties in input order). Within a group a missing
//! identifier takes the nearest preceding known value; a leading gap takes the
//! first known value in the group. Groups never borrow from each other.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::debug;

/// The slice of a record the imputer looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillInput<'a> {
    pub title: Option<&'a str>,
    pub object_id: Option<i64>,
    pub constituent_id: Option<i64>,
}

/// Fills one already-ordered group.
pub fn fill_ordered(values: &[Option<i64>]) -> Vec<Option<i64>> {
    let mut last_seen = None;
    let mut filled = values
        .iter()
        .map(|value| {
            if value.is_some() {
                last_seen = *value;
            }
            last_seen
        })
        .collect::<Vec<_>>();

    let first_known = values.iter().flatten().next().copied();
    for slot in filled.iter_mut().take_while(|slot| slot.is_none()) {
        *slot = first_known;
    }
    filled
}

/// Returns the filled identifier for every input, in input order.
pub fn impute_constituent_ids(inputs: &[FillInput<'_>]) -> Vec<Option<i64>> {
    let mut groups: BTreeMap<Option<&str>, Vec<usize>> = BTreeMap::new();
    for (idx, input) in inputs.iter().enumerate() {
        groups.entry(input.title).or_default().push(idx);
    }
    debug!(
        "Imputing constituent ids across {} title group(s)",
        groups.len()
    );

    let mut filled = vec![None; inputs.len()];
    for members in groups.values() {
        let ordered = members
            .iter()
            .copied()
            .sorted_by_key(|&idx| inputs[idx].object_id)
            .collect::<Vec<_>>();
        let raw = ordered
            .iter()
            .map(|&idx| inputs[idx].constituent_id)
            .collect::<Vec<_>>();
        for (idx, value) in ordered.into_iter().zip(fill_ordered(&raw)) {
            filled[idx] = value;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, object_id: i64, constituent_id: Option<i64>) -> FillInput<'_> {
        FillInput {
            title: Some(title),
            object_id: Some(object_id),
            constituent_id,
        }
    }

    #[test]
    fn leading_gap_takes_next_value_and_trailing_gap_carries_forward() {
        assert_eq!(fill_ordered(&[None, Some(7), None]), vec![Some(7); 3]);
    }

    #[test]
    fn forward_fill_takes_priority_over_backward_fill() {
        assert_eq!(
            fill_ordered(&[None, Some(1), None, Some(2), None]),
            vec![Some(1), Some(1), Some(1), Some(2), Some(2)]
        );
    }

    #[test]
    fn all_missing_group_stays_missing() {
        assert_eq!(fill_ordered(&[None, None]), vec![None, None]);
        assert!(fill_ordered(&[]).is_empty());
    }

    #[test]
    fn groups_are_ordered_by_object_id_before_filling() {
        let inputs = [
            input("Vase A", 3, None),
            input("Vase A", 1, None),
            input("Vase A", 2, Some(7)),
        ];
        assert_eq!(impute_constituent_ids(&inputs), vec![Some(7); 3]);

        let inputs = [
            input("Series", 20, Some(2)),
            input("Series", 15, None),
            input("Series", 10, Some(1)),
        ];
        assert_eq!(
            impute_constituent_ids(&inputs),
            vec![Some(2), Some(1), Some(1)]
        );
    }

    #[test]
    fn fill_never_crosses_title_partitions() {
        let inputs = [
            input("Bowl", 1, Some(5)),
            input("Cup", 2, None),
            input("Bowl", 3, None),
        ];
        assert_eq!(
            impute_constituent_ids(&inputs),
            vec![Some(5), None, Some(5)]
        );
    }

    #[test]
    fn missing_titles_share_one_group_and_missing_ids_sort_first() {
        let inputs = [
            FillInput {
                title: None,
                object_id: Some(4),
                constituent_id: Some(9),
            },
            FillInput {
                title: None,
                object_id: None,
                constituent_id: Some(3),
            },
            FillInput {
                title: None,
                object_id: Some(5),
                constituent_id: None,
            },
        ];
        assert_eq!(
            impute_constituent_ids(&inputs),
            vec![Some(9), Some(3), Some(9)]
        );
    }
}
