// Copyright 2025 Boundless, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Read access to the source chain.

use alloy::consensus::Transaction as _;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use alloy_primitives::{Address, Log, TxHash};

use crate::ReconstructError;

/// The part of a transaction reconstruction cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTransaction {
    /// `None` for contract creation.
    pub to: Option<Address>,
}

/// A log from a mined receipt together with its block-level log index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLog {
    pub log_index: u64,
    pub inner: Log,
}

/// Source of transactions and receipts by hash.
///
/// `Ok(None)` means the node does not know the hash (or has not mined it yet).
#[allow(async_fn_in_trait)]
pub trait ChainReader {
    async fn transaction(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ChainTransaction>, ReconstructError>;

    async fn receipt_logs(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<Vec<ReceiptLog>>, ReconstructError>;
}

/// [`ChainReader`] backed by a JSON-RPC provider.
#[derive(Debug, Clone)]
pub struct RpcReader<P> {
    provider: P,
}

impl<P: Provider> RpcReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

/// Reader over an HTTP JSON-RPC endpoint.
pub fn http_reader(rpc_url: Url) -> RpcReader<impl Provider> {
    RpcReader::new(ProviderBuilder::new().connect_http(rpc_url))
}

impl<P: Provider> ChainReader for RpcReader<P> {
    async fn transaction(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ChainTransaction>, ReconstructError> {
        let tx = self.provider.get_transaction_by_hash(tx_hash).await?;
        Ok(tx.map(|tx| ChainTransaction { to: tx.to() }))
    }

    async fn receipt_logs(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<Vec<ReceiptLog>>, ReconstructError> {
        let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? else {
            return Ok(None);
        };

        receipt
            .logs()
            .iter()
            .enumerate()
            .map(|(position, log)| {
                let log_index = log.log_index.ok_or_else(|| {
                    ReconstructError::MalformedReceipt(format!(
                        "log at position {position} of {tx_hash} has no log index"
                    ))
                })?;
                Ok(ReceiptLog {
                    log_index,
                    inner: log.inner.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
