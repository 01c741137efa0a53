// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::VoteError;
use av_engine::{ClearValue, Handle};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Clear counts keyed by handle. Holds exactly the handles that were asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult(BTreeMap<Handle, u64>);

impl AggregateResult {
    /// Converts engine output for `requested`. Fails unless every requested
    /// handle resolved to a non negative integer.
    pub fn from_clear_values(
        requested: &BTreeSet<Handle>,
        mut values: BTreeMap<Handle, ClearValue>,
    ) -> Result<Self, VoteError> {
        requested
            .iter()
            .map(|handle| {
                let value = values.remove(handle).ok_or_else(|| {
                    VoteError::DecryptionRejected(format!("no value returned for {handle}"))
                })?;
                Ok((*handle, count_of(handle, value)?))
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }

    pub fn get(&self, handle: &Handle) -> Option<u64> {
        self.0.get(handle).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Handle, &u64)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<Handle, u64> {
        self.0
    }
}

impl FromIterator<(Handle, u64)> for AggregateResult {
    fn from_iter<T: IntoIterator<Item = (Handle, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn count_of(handle: &Handle, value: ClearValue) -> Result<u64, VoteError> {
    match value {
        ClearValue::Uint(v) => u64::try_from(v).map_err(|_| {
            VoteError::DecryptionRejected(format!("value of {handle} is not a count"))
        }),
        ClearValue::Bool(b) => Ok(u64::from(b)),
        ClearValue::Bytes(_) => Err(VoteError::DecryptionRejected(format!(
            "value of {handle} is not an integer"
        ))),
    }
}

/// Orders the counts like `options`. Handle `i` belongs to option `i`; a
/// handle that is missing, or absent from `aggregate`, counts as zero.
pub fn resolve_counts<L>(
    options: &[L],
    handles: &[Handle],
    aggregate: &AggregateResult,
) -> Vec<u64> {
    (0..options.len())
        .map(|i| {
            handles
                .get(i)
                .and_then(|handle| aggregate.get(handle))
                .unwrap_or(0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, U256};
    use proptest::prelude::*;

    fn handle(n: u8) -> Handle {
        Handle::new(B256::repeat_byte(n))
    }

    #[test]
    fn test_counts_follow_option_order() {
        let handles = [handle(1), handle(2), handle(3)];
        let aggregate: AggregateResult =
            [(handle(3), 5), (handle(1), 2), (handle(2), 0)].into_iter().collect();
        assert_eq!(
            resolve_counts(&["yes", "no", "abstain"], &handles, &aggregate),
            vec![2, 0, 5]
        );
    }

    #[test]
    fn test_unsealed_aggregate_is_all_zero() {
        let options = ["a", "b", "c", "d"];
        assert_eq!(
            resolve_counts(&options, &[], &AggregateResult::default()),
            vec![0; 4]
        );
    }

    #[test]
    fn test_all_or_nothing() {
        let requested: BTreeSet<_> = [handle(1), handle(2)].into_iter().collect();
        let partial = [(handle(1), ClearValue::Uint(U256::from(3u64)))]
            .into_iter()
            .collect();
        assert!(matches!(
            AggregateResult::from_clear_values(&requested, partial),
            Err(VoteError::DecryptionRejected(_))
        ));

        let complete = [
            (handle(1), ClearValue::Uint(U256::from(3u64))),
            (handle(2), ClearValue::Bool(true)),
            (handle(9), ClearValue::Uint(U256::from(7u64))),
        ]
        .into_iter()
        .collect();
        let result = AggregateResult::from_clear_values(&requested, complete).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get(&handle(2)), Some(1));
        assert_eq!(result.get(&handle(9)), None);
    }

    #[test]
    fn test_non_count_values_rejected() {
        let requested: BTreeSet<_> = [handle(1)].into_iter().collect();
        for value in [
            ClearValue::Uint(U256::MAX),
            ClearValue::Bytes(vec![1u8].into()),
        ] {
            let values = [(handle(1), value)].into_iter().collect();
            assert!(AggregateResult::from_clear_values(&requested, values).is_err());
        }
    }

    proptest! {
        #[test]
        fn absent_handles_resolve_to_zero(
            counts in prop::collection::vec(any::<Option<u32>>(), 1..=10)
        ) {
            let handles: Vec<_> = (0..counts.len() as u8).map(handle).collect();
            let options: Vec<_> = (0..counts.len()).map(|i| format!("option {i}")).collect();
            let aggregate: AggregateResult = handles
                .iter()
                .zip(&counts)
                .filter_map(|(h, c)| c.map(|c| (*h, c as u64)))
                .collect();

            let resolved = resolve_counts(&options, &handles, &aggregate);
            prop_assert_eq!(resolved.len(), options.len());
            for (got, expected) in resolved.iter().zip(&counts) {
                prop_assert_eq!(*got, expected.map(u64::from).unwrap_or(0));
            }
        }
    }
}
