// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BallotError {
    #[error("A topic needs at least one option")]
    NoOptions,

    #[error("Choice {choice} is out of range for {options} options")]
    ChoiceOutOfRange { choice: usize, options: usize },

    #[error("Vector is not one-hot: {0:?}")]
    NotOneHot(Vec<u64>),
}

/// A single choice among a topic's options, one lane per option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotVote {
    lanes: Vec<u64>,
}

impl OneHotVote {
    pub fn new(options: usize, choice: usize) -> Result<Self, BallotError> {
        if options == 0 {
            return Err(BallotError::NoOptions);
        }
        if choice >= options {
            return Err(BallotError::ChoiceOutOfRange { choice, options });
        }
        let mut lanes = vec![0; options];
        lanes[choice] = 1;
        Ok(Self { lanes })
    }

    /// Accepts a vector only if exactly one lane is 1 and the rest are 0.
    pub fn from_lanes(lanes: Vec<u64>) -> Result<Self, BallotError> {
        let ones = lanes.iter().filter(|v| **v == 1).count();
        let zeros = lanes.iter().filter(|v| **v == 0).count();
        if ones != 1 || ones + zeros != lanes.len() {
            return Err(BallotError::NotOneHot(lanes));
        }
        Ok(Self { lanes })
    }

    pub fn choice(&self) -> usize {
        self.lanes.iter().position(|v| *v == 1).unwrap_or_default()
    }

    pub fn lanes(&self) -> &[u64] {
        &self.lanes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot() {
        let vote = OneHotVote::new(4, 2).unwrap();
        assert_eq!(vote.lanes(), &[0, 0, 1, 0]);
        assert_eq!(vote.choice(), 2);
        assert_eq!(
            OneHotVote::new(4, 4),
            Err(BallotError::ChoiceOutOfRange {
                choice: 4,
                options: 4
            })
        );
        assert_eq!(OneHotVote::new(0, 0), Err(BallotError::NoOptions));
    }

    #[test]
    fn test_from_lanes() {
        assert!(OneHotVote::from_lanes(vec![0, 1, 0]).is_ok());
        for lanes in [vec![], vec![0, 0], vec![1, 1], vec![0, 2], vec![1, 0, 3]] {
            assert!(OneHotVote::from_lanes(lanes).is_err());
        }
    }
}
