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

//! Packed encoding of deposit intents (version 1).
//!
//! Layout, all integers big-endian, no padding between fields:
//!
//! | offset | size | field             |
//! |--------|------|-------------------|
//! | 0      | 4    | magic `5a2e0acd`  |
//! | 4      | 4    | version           |
//! | 8      | 32   | amount            |
//! | 40     | 4    | remote domain     |
//! | 44     | 32   | remote token      |
//! | 76     | 32   | remote recipient  |
//! | 108    | 32   | local token       |
//! | 140    | 32   | local depositor   |
//! | 172    | 32   | max fee           |
//! | 204    | 32   | nonce             |
//! | 236    | 4    | hook data length  |
//! | 240    | n    | hook data         |

use alloy_primitives::{B256, U256, keccak256};
use thiserror::Error;

use crate::{DEPOSIT_INTENT_MAGIC, DepositIntent, IntentVersion, address_to_word};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("hook data is {0} bytes, exceeds the 32-bit length field")]
    HookDataTooLong(usize),
}

/// Appends the canonical encoding of `intent` to `out`.
///
/// Nothing is written if the intent cannot be encoded.
pub fn encode_into(intent: &DepositIntent, out: &mut Vec<u8>) -> Result<(), EncodingError> {
    let hook_data = intent.hook_data_bytes();
    let hook_data_len = u32::try_from(hook_data.len())
        .map_err(|_| EncodingError::HookDataTooLong(hook_data.len()))?;

    out.reserve(intent.encoded_len());

    match intent.version() {
        IntentVersion::V1 => {
            out.extend_from_slice(&DEPOSIT_INTENT_MAGIC);
            out.extend_from_slice(&u32::from(IntentVersion::V1).to_be_bytes());
            out.extend_from_slice(&intent.amount().to_be_bytes::<32>());
            out.extend_from_slice(&intent.remote_domain().to_be_bytes());
            out.extend_from_slice(intent.remote_token().as_slice());
            out.extend_from_slice(intent.remote_recipient().as_slice());
            out.extend_from_slice(address_to_word(intent.local_token()).as_slice());
            out.extend_from_slice(address_to_word(intent.local_depositor()).as_slice());
            out.extend_from_slice(&intent.max_fee().to_be_bytes::<32>());
            out.extend_from_slice(intent.nonce().as_slice());
            out.extend_from_slice(&hook_data_len.to_be_bytes());
            out.extend_from_slice(hook_data);
        }
    }

    Ok(())
}

/// Encode `intent` into a fresh buffer.
///
/// Prefer [`encode_into`] with a reusable buffer when encoding many intents.
pub fn encode(intent: &DepositIntent) -> Result<Vec<u8>, EncodingError> {
    let mut buf = Vec::with_capacity(intent.encoded_len());
    encode_into(intent, &mut buf)?;
    Ok(buf)
}

/// Message hash of an already encoded intent.
#[inline]
pub fn hash(encoded: &[u8]) -> B256 {
    keccak256(encoded)
}

/// `hash(encode(intent))`.
pub fn message_hash(intent: &DepositIntent) -> Result<B256, EncodingError> {
    Ok(hash(&encode(intent)?))
}

/// Derive the nonce binding an intent to one log of one transaction under one source
/// domain.
///
/// Formula: `keccak256(uint256(source_domain) || tx_hash || uint256(event_index))`
pub fn derive_nonce(source_domain: u32, tx_hash: B256, event_index: u64) -> B256 {
    let mut input = [0u8; 96];
    input[..32].copy_from_slice(&U256::from(source_domain).to_be_bytes::<32>());
    input[32..64].copy_from_slice(tx_hash.as_slice());
    input[64..].copy_from_slice(&U256::from(event_index).to_be_bytes::<32>());
    keccak256(input)
}
