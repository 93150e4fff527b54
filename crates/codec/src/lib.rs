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

//! Canonical encoding and hashing of cross-domain deposit intents.
//!
//! The byte layout reproduced here must match the on-chain reserve contract exactly,
//! otherwise the message hash handed to attesters will not match the one the contract
//! computed when the deposit was made.

pub mod decode;
pub mod encode;

use alloy_primitives::{Address, B256, Bytes, FixedBytes, U256, keccak256};
use serde::Serialize;
use thiserror::Error;

pub use decode::{DecodeError, decode};
pub use encode::{EncodingError, derive_nonce, encode, encode_into, hash, message_hash};

/// Format discriminator placed at the start of every encoded intent.
pub const DEPOSIT_INTENT_MAGIC: [u8; 4] = [0x5a, 0x2e, 0x0a, 0xcd];

/// Length of the fixed part of the encoding, everything before the hook data bytes.
pub const DEPOSIT_INTENT_PREFIX_LEN: usize = 240;

/// Version tag of the intent wire format.
///
/// Each variant is its own layout. Adding a version means adding a variant and an
/// encoder arm for it, version 1 stays untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u32")]
#[repr(u32)]
pub enum IntentVersion {
    #[default]
    V1 = 1,
}

impl From<IntentVersion> for u32 {
    fn from(version: IntentVersion) -> Self {
        version as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported deposit intent version: {0}")]
pub struct UnsupportedVersion(pub u32);

impl TryFrom<u32> for IntentVersion {
    type Error = UnsupportedVersion;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(IntentVersion::V1),
            other => Err(UnsupportedVersion(other)),
        }
    }
}

/// The caller-supplied part of a deposit: everything except the version tag and the
/// nonce, which are fixed by the format and derived from transaction context.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepositParams {
    pub amount: U256,
    pub remote_domain: u32,
    pub remote_token: B256,
    pub remote_recipient: B256,
    pub local_token: Address,
    pub local_depositor: Address,
    pub max_fee: U256,
    pub hook_data: Bytes,
}

/// A fully specified deposit intent.
///
/// Immutable once built; all fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositIntent {
    version: IntentVersion,
    amount: U256,
    remote_domain: u32,
    remote_token: B256,
    remote_recipient: B256,
    local_token: Address,
    local_depositor: Address,
    max_fee: U256,
    nonce: B256,
    #[serde(skip_serializing_if = "Option::is_none")]
    hook_data: Option<Bytes>,
}

impl DepositIntent {
    /// Builds a version 1 intent. Empty hook data is stored as absent.
    pub fn new(params: DepositParams, nonce: B256) -> Self {
        let DepositParams {
            amount,
            remote_domain,
            remote_token,
            remote_recipient,
            local_token,
            local_depositor,
            max_fee,
            hook_data,
        } = params;

        Self {
            version: IntentVersion::V1,
            amount,
            remote_domain,
            remote_token,
            remote_recipient,
            local_token,
            local_depositor,
            max_fee,
            nonce,
            hook_data: (!hook_data.is_empty()).then_some(hook_data),
        }
    }

    pub fn version(&self) -> IntentVersion {
        self.version
    }

    pub fn amount(&self) -> U256 {
        self.amount
    }

    pub fn remote_domain(&self) -> u32 {
        self.remote_domain
    }

    pub fn remote_token(&self) -> B256 {
        self.remote_token
    }

    pub fn remote_recipient(&self) -> B256 {
        self.remote_recipient
    }

    pub fn local_token(&self) -> Address {
        self.local_token
    }

    pub fn local_depositor(&self) -> Address {
        self.local_depositor
    }

    pub fn max_fee(&self) -> U256 {
        self.max_fee
    }

    pub fn nonce(&self) -> B256 {
        self.nonce
    }

    pub fn hook_data(&self) -> Option<&Bytes> {
        self.hook_data.as_ref()
    }

    /// Hook data bytes, empty when absent.
    pub fn hook_data_bytes(&self) -> &[u8] {
        match &self.hook_data {
            Some(hook_data) => &hook_data[..],
            None => &[],
        }
    }

    /// Size of [`encode`] output for this intent.
    pub fn encoded_len(&self) -> usize {
        DEPOSIT_INTENT_PREFIX_LEN + self.hook_data_bytes().len()
    }
}

/// Widens a 20-byte address to a 32-byte word, left padded with zeroes.
pub fn address_to_word(addr: Address) -> B256 {
    let mut padded = [0u8; 32];
    padded[12..].copy_from_slice(addr.as_slice());
    FixedBytes::from(padded)
}

/// Narrows a 32-byte word back to an address. Returns `None` if the upper 12 bytes are
/// not all zero.
pub fn word_to_address(word: B256) -> Option<Address> {
    word[..12]
        .iter()
        .all(|b| *b == 0)
        .then(|| Address::from_slice(&word[12..]))
}

/// Recipient identifier for destinations whose parties are not addresses: the keccak256
/// of the UTF-8 party id.
pub fn recipient_id(party: &str) -> B256 {
    keccak256(party.as_bytes())
}
