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

//! Parsing of encoded deposit intents back into [`DepositIntent`] values.

use alloy_primitives::{Address, B256, Bytes, FixedBytes, U256};
use thiserror::Error;

use crate::{
    DEPOSIT_INTENT_MAGIC, DEPOSIT_INTENT_PREFIX_LEN, DepositIntent, DepositParams, IntentVersion,
    UnsupportedVersion, word_to_address,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload too short: expected at least 240 bytes, got {0}")]
    Truncated(usize),
    #[error("not a deposit intent: magic is {0}")]
    BadMagic(FixedBytes<4>),
    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedVersion),
    #[error("{field} word has non-zero padding: {word}")]
    DirtyAddressPadding { field: &'static str, word: B256 },
    #[error("hook data length field says {declared} bytes, payload carries {actual}")]
    HookDataLength { declared: u32, actual: usize },
}

/// Parse a canonical encoding.
///
/// Only the exact output of [`encode`](crate::encode) is accepted, so
/// `encode(&decode(bytes)?) == bytes` holds for every successful decode.
pub fn decode(bytes: &[u8]) -> Result<DepositIntent, DecodeError> {
    if bytes.len() < DEPOSIT_INTENT_PREFIX_LEN {
        return Err(DecodeError::Truncated(bytes.len()));
    }

    let mut reader = Reader { bytes, pos: 0 };

    let magic: [u8; 4] = reader.take();
    if magic != DEPOSIT_INTENT_MAGIC {
        return Err(DecodeError::BadMagic(FixedBytes(magic)));
    }

    match IntentVersion::try_from(u32::from_be_bytes(reader.take()))? {
        IntentVersion::V1 => decode_v1(&mut reader),
    }
}

fn decode_v1(reader: &mut Reader<'_>) -> Result<DepositIntent, DecodeError> {
    let amount = U256::from_be_bytes::<32>(reader.take());
    let remote_domain = u32::from_be_bytes(reader.take());
    let remote_token = B256::from(reader.take::<32>());
    let remote_recipient = B256::from(reader.take::<32>());
    let local_token = reader.address("local token")?;
    let local_depositor = reader.address("local depositor")?;
    let max_fee = U256::from_be_bytes::<32>(reader.take());
    let nonce = B256::from(reader.take::<32>());

    let declared = u32::from_be_bytes(reader.take());
    let rest = reader.rest();
    if declared as usize != rest.len() {
        return Err(DecodeError::HookDataLength {
            declared,
            actual: rest.len(),
        });
    }

    Ok(DepositIntent::new(
        DepositParams {
            amount,
            remote_domain,
            remote_token,
            remote_recipient,
            local_token,
            local_depositor,
            max_fee,
            hook_data: Bytes::copy_from_slice(rest),
        },
        nonce,
    ))
}

/// Cursor over the fixed prefix. Length was checked up front, so reads cannot run past
/// the end of the prefix.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn address(&mut self, field: &'static str) -> Result<Address, DecodeError> {
        let word = B256::from(self.take::<32>());
        word_to_address(word).ok_or(DecodeError::DirtyAddressPadding { field, word })
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode, recipient_id};
    use alloy_primitives::address;

    fn sample(hook_data: &'static [u8]) -> DepositIntent {
        DepositIntent::new(
            DepositParams {
                amount: U256::from(5_000_000u64),
                remote_domain: 10001,
                remote_token: B256::repeat_byte(0x74),
                remote_recipient: recipient_id("bob::1220"),
                local_token: address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
                local_depositor: address!("00000000000000000000000000000000000000bb"),
                max_fee: U256::from(1u64),
                hook_data: Bytes::from_static(hook_data),
            },
            B256::repeat_byte(0x33),
        )
    }

    #[test]
    fn test_decode_inverts_encode() {
        for hook in [&[][..], &[0xca, 0xfe][..]] {
            let intent = sample(hook);
            let encoded = encode(&intent).unwrap();
            assert_eq!(decode(&encoded).unwrap(), intent);
        }
    }

    #[test]
    fn test_rejects_short_payload() {
        let encoded = encode(&sample(&[])).unwrap();
        assert_eq!(decode(&encoded[..239]), Err(DecodeError::Truncated(239)));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut encoded = encode(&sample(&[])).unwrap();
        encoded[0] = 0x00;
        assert!(matches!(decode(&encoded), Err(DecodeError::BadMagic(_))));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut encoded = encode(&sample(&[])).unwrap();
        encoded[4..8].copy_from_slice(&2u32.to_be_bytes());
        assert_eq!(
            decode(&encoded),
            Err(DecodeError::UnsupportedVersion(UnsupportedVersion(2)))
        );
    }

    #[test]
    fn test_rejects_dirty_address_padding() {
        let mut encoded = encode(&sample(&[])).unwrap();
        encoded[140] = 0x01;
        assert!(matches!(
            decode(&encoded),
            Err(DecodeError::DirtyAddressPadding {
                field: "local depositor",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let mut encoded = encode(&sample(&[1, 2, 3])).unwrap();
        encoded.push(4);
        assert_eq!(
            decode(&encoded),
            Err(DecodeError::HookDataLength {
                declared: 3,
                actual: 4
            })
        );
    }
}
