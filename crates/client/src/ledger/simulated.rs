// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{LedgerError, NewTopic, Topic, VoteLedger};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use av_engine::{unix_now, CipherBundle, Handle, SimulationCoprocessor};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug)]
struct TopicState {
    topic: Topic,
    max_per_address: u32,
    used: HashMap<Address, u32>,
    voters: BTreeSet<Address>,
    aggregate: Vec<Handle>,
}

/// Vote hub running on the simulation coprocessor of a local chain.
///
/// Mirrors `pushCipherOneHot`: the input proof is checked for (hub, voter),
/// every lane is added into the topic's aggregate and the hub and everyone
/// who voted may decrypt the new aggregate.
#[derive(Debug)]
pub struct SimulatedVoteHub {
    address: Address,
    coprocessor: Arc<SimulationCoprocessor>,
    topics: RwLock<HashMap<U256, TopicState>>,
}

impl SimulatedVoteHub {
    pub fn new(address: Address, coprocessor: Arc<SimulationCoprocessor>) -> Self {
        Self {
            address,
            coprocessor,
            topics: RwLock::new(HashMap::new()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn launch_topic(&self, owner: Address, new: NewTopic) -> Result<U256, LedgerError> {
        new.validate()?;
        let mut topics = self.topics.write().await;
        let id = U256::from(topics.len());
        topics.insert(
            id,
            TopicState {
                topic: Topic {
                    id,
                    name: new.name,
                    details: new.details,
                    options: new.options,
                    open_at: new.open_at,
                    close_at: new.close_at,
                    published: false,
                    owner,
                },
                max_per_address: new.max_per_address,
                used: HashMap::new(),
                voters: BTreeSet::new(),
                aggregate: Vec::new(),
            },
        );
        info!(topic = %id, "topic launched");
        Ok(id)
    }

    pub async fn count_topics(&self) -> usize {
        self.topics.read().await.len()
    }

    /// A session where every write is sent by `voter`.
    pub fn connect(self: &Arc<Self>, voter: Address) -> HubSession {
        HubSession {
            hub: self.clone(),
            voter,
        }
    }

    async fn push(
        &self,
        voter: Address,
        topic_id: U256,
        bundle: &CipherBundle,
    ) -> Result<(), LedgerError> {
        let mut topics = self.topics.write().await;
        let state = topics
            .get_mut(&topic_id)
            .ok_or(LedgerError::UnknownTopic(topic_id))?;

        if !state.topic.is_open(unix_now()) {
            return Err(LedgerError::Rejected("topic is not open".into()));
        }
        let used = state.used.get(&voter).copied().unwrap_or_default();
        if state.max_per_address != 0 && used >= state.max_per_address {
            return Err(LedgerError::Rejected(format!(
                "{voter} already used {used} of {} ballots",
                state.max_per_address
            )));
        }
        if bundle.handles.len() != state.topic.options.len() {
            return Err(LedgerError::Rejected(format!(
                "expected {} lanes, got {}",
                state.topic.options.len(),
                bundle.handles.len()
            )));
        }

        let lanes = self
            .coprocessor
            .verify_input(bundle, self.address, voter)
            .await?;

        if state.aggregate.is_empty() {
            for _ in &lanes {
                state.aggregate.push(self.coprocessor.trivial_encrypt(0).await);
            }
        }
        let mut aggregate = Vec::with_capacity(lanes.len());
        for (total, lane) in state.aggregate.iter().zip(&lanes) {
            aggregate.push(self.coprocessor.add(*total, *lane).await?);
        }

        state.voters.insert(voter);
        for handle in &aggregate {
            self.coprocessor.allow(*handle, self.address).await?;
            for account in &state.voters {
                self.coprocessor.allow(*handle, *account).await?;
            }
        }
        state.aggregate = aggregate;
        *state.used.entry(voter).or_default() += 1;

        debug!(topic = %topic_id, %voter, "ballot counted");
        Ok(())
    }
}

/// [`SimulatedVoteHub`] seen from one voter's wallet.
#[derive(Debug, Clone)]
pub struct HubSession {
    hub: Arc<SimulatedVoteHub>,
    voter: Address,
}

impl HubSession {
    pub fn voter(&self) -> Address {
        self.voter
    }

    pub fn hub(&self) -> &Arc<SimulatedVoteHub> {
        &self.hub
    }
}

#[async_trait]
impl VoteLedger for HubSession {
    async fn topic(&self, topic_id: U256) -> Result<Topic, LedgerError> {
        self.hub
            .topics
            .read()
            .await
            .get(&topic_id)
            .map(|state| state.topic.clone())
            .ok_or(LedgerError::UnknownTopic(topic_id))
    }

    async fn aggregate_handles(&self, topic_id: U256) -> Result<Vec<Handle>, LedgerError> {
        self.hub
            .topics
            .read()
            .await
            .get(&topic_id)
            .map(|state| state.aggregate.clone())
            .ok_or(LedgerError::UnknownTopic(topic_id))
    }

    async fn push_cipher(&self, topic_id: U256, bundle: &CipherBundle) -> Result<(), LedgerError> {
        self.hub.push(self.voter, topic_id, bundle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use av_config::SimulationFixture;

    const HUB: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
    const OWNER: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    fn hub() -> Arc<SimulatedVoteHub> {
        let coprocessor =
            Arc::new(SimulationCoprocessor::new(SimulationFixture::default()).unwrap());
        Arc::new(SimulatedVoteHub::new(HUB, coprocessor))
    }

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    fn topic(options: Vec<String>, open_at: u64, close_at: u64) -> NewTopic {
        NewTopic {
            name: "t".to_string(),
            details: String::new(),
            options,
            open_at,
            close_at,
            max_per_address: 0,
        }
    }

    #[tokio::test]
    async fn test_launch_validation() {
        let hub = hub();
        assert!(hub
            .launch_topic(OWNER, topic(vec![], 0, u64::MAX))
            .await
            .is_err());
        assert!(hub
            .launch_topic(OWNER, topic(options(2), 10, 10))
            .await
            .is_err());
        let id = hub
            .launch_topic(OWNER, topic(options(2), 0, u64::MAX))
            .await
            .unwrap();
        assert_eq!(id, U256::ZERO);
        assert_eq!(hub.count_topics().await, 1);

        let session = hub.connect(OWNER);
        assert_eq!(session.topic(id).await.unwrap().options, options(2));
        assert!(session.aggregate_handles(id).await.unwrap().is_empty());
        assert_eq!(
            session.topic(U256::from(5)).await,
            Err(LedgerError::UnknownTopic(U256::from(5)))
        );
    }

    #[tokio::test]
    async fn test_closed_topic_rejects_ballots() {
        let hub = hub();
        let id = hub
            .launch_topic(OWNER, topic(options(2), 0, 1))
            .await
            .unwrap();
        let bundle = hub
            .coprocessor
            .register_input(HUB, OWNER, &[1, 0])
            .await
            .unwrap();
        assert!(matches!(
            hub.connect(OWNER).push_cipher(id, &bundle).await,
            Err(LedgerError::Rejected(_))
        ));
    }
}
