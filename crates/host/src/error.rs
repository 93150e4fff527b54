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

use std::fmt;

use alloy::transports::TransportError;
use alloy_primitives::{Address, B256, TxHash};
use intent_codec::EncodingError;
use serde::Serialize;
use thiserror::Error;

use crate::chain::ReceiptLog;

/// Errors that end a reconstruction attempt. None of them are retried internally.
///
/// The not-found and decode variants carry enough context to pick an `--event-index`
/// by hand on the next attempt.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// Not `0x` followed by 64 hex characters.
    #[error("invalid transaction hash {0:?}: expected 0x followed by 64 hex characters")]
    InvalidTxHash(String),

    /// No receipt (unknown or unconfirmed hash).
    #[error("transaction {0} not found")]
    TransactionNotFound(TxHash),

    /// The transaction created a contract, so it cannot be a deposit call.
    #[error("transaction {0} has no recipient (contract call required)")]
    NoRecipient(TxHash),

    #[error("no log found at index {index}; available logs:\n{logs}")]
    LogIndexNotFound { index: u64, logs: LogListing },

    #[error(
        "no event found from contract {target}, use --event-index to specify the log manually; available logs:\n{logs}"
    )]
    NoMatchingLog { target: Address, logs: LogListing },

    #[error(
        "contract {target} emitted several deposit candidates at log indices {candidates:?}, use --event-index to pick one"
    )]
    AmbiguousLog { target: Address, candidates: Vec<u64> },

    #[error(
        "event at index {index} is not a DepositedToRemote event, check the list below for the correct event index:\n{logs}"
    )]
    EventDecode {
        index: u64,
        logs: LogListing,
        #[source]
        source: alloy_sol_types::Error,
    },

    #[error("malformed receipt: {0}")]
    MalformedReceipt(String),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("RPC error: {0}")]
    Rpc(#[from] TransportError),
}

impl ReconstructError {
    /// True for the transaction, log-index and target-log lookups that came back empty.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TransactionNotFound(_)
                | Self::LogIndexNotFound { .. }
                | Self::NoMatchingLog { .. }
                | Self::AmbiguousLog { .. }
        )
    }

    /// The receipt listing attached to the error, if any.
    pub fn logs(&self) -> Option<&[LogSummary]> {
        match self {
            Self::LogIndexNotFound { logs, .. }
            | Self::NoMatchingLog { logs, .. }
            | Self::EventDecode { logs, .. } => Some(&logs.0),
            _ => None,
        }
    }
}

/// One line of the receipt listing shown when log selection or decoding fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSummary {
    pub log_index: u64,
    pub address: Address,
    pub topic0: Option<B256>,
}

impl From<&ReceiptLog> for LogSummary {
    fn from(log: &ReceiptLog) -> Self {
        Self {
            log_index: log.log_index,
            address: log.inner.address,
            topic0: log.inner.topics().first().copied(),
        }
    }
}

/// All logs of a receipt, in receipt order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogListing(pub Vec<LogSummary>);

impl From<&[ReceiptLog]> for LogListing {
    fn from(logs: &[ReceiptLog]) -> Self {
        Self(logs.iter().map(LogSummary::from).collect())
    }
}

impl fmt::Display for LogListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "  (receipt has no logs)");
        }
        for (i, log) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  [{i}] Log Index: {}, Address: {}, Topic0: ", log.log_index, log.address)?;
            match log.topic0 {
                Some(topic) => write!(f, "{topic}")?,
                None => write!(f, "none")?,
            }
        }
        Ok(())
    }
}
