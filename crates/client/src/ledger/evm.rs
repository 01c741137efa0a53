// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use super::{LedgerError, NewTopic, Topic, VoteLedger};
use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::Log,
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;
use av_engine::{CipherBundle, Handle};
use tracing::{debug, info};

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract AuroraVoteHub {
        event TopicLaunched(uint256 indexed topicId, address indexed owner, string name, uint64 openAt, uint64 closeAt);
        event CipherPushed(uint256 indexed topicId, address indexed voter);

        function countTopics() external view returns (uint256);
        function fetchTopic(uint256 topicId) external view returns (string memory name, string memory details, string[] memory options, uint64 openAt, uint64 closeAt, bool published, address owner);
        function encryptedAggregateOf(uint256 topicId) external view returns (bytes32[] memory);
        function maxQuotaPerAddress(uint256 topicId) external view returns (uint32);
        function usedQuotaBy(address voter, uint256 topicId) external view returns (uint32);
        function launchTopic(string calldata name, string calldata details, string[] calldata options, uint64 openAt, uint64 closeAt, uint32 maxPer) external returns (uint256 topicId);
        function pushCipherOneHot(uint256 topicId, bytes32[] calldata onehot, bytes calldata proof) external;
    }
}

fn rpc_error(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Rpc(e.to_string())
}

/// The deployed vote hub reached over JSON-RPC.
///
/// Writes need a provider built with a wallet; a read only ledger fails
/// `push_cipher` at the node.
#[derive(Clone)]
pub struct EvmVoteLedger {
    provider: DynProvider,
    address: Address,
}

impl EvmVoteLedger {
    pub async fn connect(rpc_url: &str, address: Address) -> Result<Self, LedgerError> {
        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(rpc_error)?;
        Ok(Self::from_provider(provider.erased(), address))
    }

    pub async fn connect_with_wallet(
        rpc_url: &str,
        address: Address,
        signer: PrivateKeySigner,
    ) -> Result<Self, LedgerError> {
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(rpc_url)
            .await
            .map_err(rpc_error)?;
        Ok(Self::from_provider(provider.erased(), address))
    }

    pub fn from_provider(provider: DynProvider, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn count_topics(&self) -> Result<U256, LedgerError> {
        let contract = AuroraVoteHub::new(self.address, &self.provider);
        contract.countTopics().call().await.map_err(rpc_error)
    }

    /// Ballots `voter` already cast on a topic and the topic's limit.
    pub async fn quota(&self, topic_id: U256, voter: Address) -> Result<(u32, u32), LedgerError> {
        let contract = AuroraVoteHub::new(self.address, &self.provider);
        let used = contract
            .usedQuotaBy(voter, topic_id)
            .call()
            .await
            .map_err(rpc_error)?;
        let max = contract
            .maxQuotaPerAddress(topic_id)
            .call()
            .await
            .map_err(rpc_error)?;
        Ok((used, max))
    }

    /// Sends `launchTopic` and reads the new id from the `TopicLaunched` log.
    pub async fn launch_topic(&self, new: NewTopic) -> Result<U256, LedgerError> {
        new.validate()?;
        let contract = AuroraVoteHub::new(self.address, &self.provider);
        let receipt = contract
            .launchTopic(
                new.name,
                new.details,
                new.options,
                new.open_at,
                new.close_at,
                new.max_per_address,
            )
            .send()
            .await
            .map_err(rpc_error)?
            .get_receipt()
            .await
            .map_err(rpc_error)?;
        if !receipt.status() {
            return Err(LedgerError::Rejected(format!(
                "launchTopic reverted in {}",
                receipt.transaction_hash
            )));
        }
        let topic_id = launched_topic(receipt.inner.logs())?;
        info!(topic = %topic_id, tx = %receipt.transaction_hash, "topic launched");
        Ok(topic_id)
    }
}

fn launched_topic(logs: &[Log]) -> Result<U256, LedgerError> {
    logs.iter()
        .find_map(|log| log.log_decode::<AuroraVoteHub::TopicLaunched>().ok())
        .map(|log| log.inner.data.topicId)
        .ok_or_else(|| LedgerError::Rpc("receipt has no TopicLaunched log".into()))
}

#[async_trait]
impl VoteLedger for EvmVoteLedger {
    async fn topic(&self, topic_id: U256) -> Result<Topic, LedgerError> {
        let contract = AuroraVoteHub::new(self.address, &self.provider);
        let topic = contract
            .fetchTopic(topic_id)
            .call()
            .await
            .map_err(rpc_error)?;
        if topic.options.is_empty() && topic.owner == Address::ZERO {
            return Err(LedgerError::UnknownTopic(topic_id));
        }
        Ok(Topic {
            id: topic_id,
            name: topic.name,
            details: topic.details,
            options: topic.options,
            open_at: topic.openAt,
            close_at: topic.closeAt,
            published: topic.published,
            owner: topic.owner,
        })
    }

    async fn aggregate_handles(&self, topic_id: U256) -> Result<Vec<Handle>, LedgerError> {
        let contract = AuroraVoteHub::new(self.address, &self.provider);
        let handles = contract
            .encryptedAggregateOf(topic_id)
            .call()
            .await
            .map_err(rpc_error)?;
        Ok(handles.into_iter().map(Handle::from).collect())
    }

    async fn push_cipher(&self, topic_id: U256, bundle: &CipherBundle) -> Result<(), LedgerError> {
        let contract = AuroraVoteHub::new(self.address, &self.provider);
        let onehot = bundle.handles.iter().map(Handle::as_b256).collect();
        let receipt = contract
            .pushCipherOneHot(topic_id, onehot, bundle.input_proof.clone())
            .send()
            .await
            .map_err(rpc_error)?
            .get_receipt()
            .await
            .map_err(rpc_error)?;
        if !receipt.status() {
            return Err(LedgerError::Rejected(format!(
                "pushCipherOneHot reverted in {}",
                receipt.transaction_hash
            )));
        }
        debug!(topic = %topic_id, tx = %receipt.transaction_hash, "ballot submitted");
        Ok(())
    }
}
