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

//! Picks the deposit log out of a receipt.

use alloy_primitives::Address;
use alloy_sol_types::SolEvent;
use tracing::debug;

use crate::chain::ReceiptLog;
use crate::error::LogListing;
use crate::{DepositedToRemote, ReconstructError};

/// Select the log to decode.
///
/// With an explicit `event_index` the log carrying exactly that index is returned.
/// Otherwise the deposit is assumed to be emitted by the called contract itself: logs
/// from `target` are collected and, if there are several, narrowed to the ones whose
/// first topic is the `DepositedToRemote` signature. More than one survivor is an error
/// rather than a guess. Deposits routed through an intermediate contract are not found
/// this way and need an explicit index.
pub fn select_log(
    logs: &[ReceiptLog],
    target: Address,
    event_index: Option<u64>,
) -> Result<&ReceiptLog, ReconstructError> {
    if let Some(index) = event_index {
        return logs
            .iter()
            .find(|log| log.log_index == index)
            .ok_or_else(|| ReconstructError::LogIndexNotFound {
                index,
                logs: LogListing::from(logs),
            });
    }

    // Address equality is on raw bytes, so the hex casing of either side is irrelevant.
    let from_target: Vec<&ReceiptLog> = logs
        .iter()
        .filter(|log| log.inner.address == target)
        .collect();
    debug!(%target, candidates = from_target.len(), "matched logs against target contract");

    match from_target.as_slice() {
        [] => Err(ReconstructError::NoMatchingLog {
            target,
            logs: LogListing::from(logs),
        }),
        [only] => Ok(*only),
        several => {
            let deposits: Vec<&ReceiptLog> = several
                .iter()
                .copied()
                .filter(|log| {
                    log.inner.topics().first() == Some(&DepositedToRemote::SIGNATURE_HASH)
                })
                .collect();
            if let [only] = deposits.as_slice() {
                return Ok(*only);
            }
            let candidates = if deposits.is_empty() {
                several
            } else {
                deposits.as_slice()
            };
            Err(ReconstructError::AmbiguousLog {
                target,
                candidates: candidates.iter().map(|log| log.log_index).collect(),
            })
        }
    }
}
