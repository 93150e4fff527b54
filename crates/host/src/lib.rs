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

pub mod chain;
pub mod error;
pub mod select;

use alloy::transports::http::reqwest::Url;
use alloy_primitives::{B256, Bytes, TxHash, utils::format_units};
use alloy_sol_types::{SolEvent, sol};
use intent_codec::{DepositIntent, DepositParams, derive_nonce, encode, hash};
use serde::Serialize;
use tracing::{info, warn};

pub use chain::{ChainReader, ChainTransaction, ReceiptLog, RpcReader, http_reader};
pub use error::{LogListing, LogSummary, ReconstructError};
pub use select::select_log;

/// Public Sepolia endpoint used when no RPC URL is given.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

pub const DEFAULT_SOURCE_DOMAIN: u32 = 0;

/// Decimals used when logging deposit amounts.
const AMOUNT_DECIMALS: u8 = 6;

sol! {
    /// @notice Emitted by the reserve contract when tokens are locked for a remote domain.
    /// @dev Topic0
    ///      0x2eef4ec627e0f99d1cc55f26e234a6066090b7bc0b3f61245f1f2d7c91d3e563.
    #[derive(Debug)]
    event DepositedToRemote(
        address indexed localToken,
        uint256 value,
        address indexed localDepositor,
        bytes32 indexed remoteRecipient,
        uint32 remoteDomain,
        bytes32 remoteToken,
        uint256 maxFee,
        bytes hookData
    );
}

#[derive(Debug, Clone)]
pub struct ReconstructOptions {
    pub rpc_url: Url,
    /// Domain of the chain the deposit was made on; part of the nonce preimage.
    pub source_domain: u32,
    /// Log index of the deposit event. Auto-detected from the called contract when unset.
    pub event_index: Option<u64>,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.parse().expect("default RPC URL is valid"),
            source_domain: DEFAULT_SOURCE_DOMAIN,
            event_index: None,
        }
    }
}

/// A reconstructed intent together with its canonical encoding and message hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconstruction {
    pub intent: DepositIntent,
    pub event_index: u64,
    pub encoded: Bytes,
    pub message_hash: B256,
}

/// Parse a transaction hash given as `0x` followed by 64 hex characters.
pub fn parse_tx_hash(s: &str) -> Result<TxHash, ReconstructError> {
    if s.len() != 66 || !s.starts_with("0x") {
        return Err(ReconstructError::InvalidTxHash(s.to_string()));
    }
    s.parse().map_err(|_| ReconstructError::InvalidTxHash(s.to_string()))
}

/// Rebuild the deposit intent emitted by `tx_hash` and compute its message hash.
///
/// Read-only and safe to retry.
pub async fn reconstruct<R: ChainReader>(
    reader: &R,
    tx_hash: TxHash,
    options: &ReconstructOptions,
) -> Result<Reconstruction, ReconstructError> {
    info!(%tx_hash, source_domain = options.source_domain, "Fetching transaction");

    let (tx, logs) = tokio::try_join!(reader.transaction(tx_hash), reader.receipt_logs(tx_hash))?;
    let logs = logs.ok_or(ReconstructError::TransactionNotFound(tx_hash))?;
    let tx = tx.ok_or(ReconstructError::TransactionNotFound(tx_hash))?;
    let target = tx.to.ok_or(ReconstructError::NoRecipient(tx_hash))?;

    let log = select_log(&logs, target, options.event_index)?;

    let event = match DepositedToRemote::decode_log_validate(&log.inner) {
        Ok(decoded) => decoded.data,
        Err(source) => {
            warn!(
                log_index = log.log_index,
                address = %log.inner.address,
                "Failed to decode DepositedToRemote event"
            );
            return Err(ReconstructError::EventDecode {
                index: log.log_index,
                logs: LogListing::from(&logs[..]),
                source,
            });
        }
    };

    let nonce = derive_nonce(options.source_domain, tx_hash, log.log_index);

    info!(
        event_index = log.log_index,
        depositor = %event.localDepositor,
        amount = %format_units(event.value, AMOUNT_DECIMALS)
            .unwrap_or_else(|_| event.value.to_string()),
        remote_domain = event.remoteDomain,
        local_token = %event.localToken,
        remote_token = %event.remoteToken,
        "Decoded deposit event"
    );

    let intent = DepositIntent::new(
        DepositParams {
            amount: event.value,
            remote_domain: event.remoteDomain,
            remote_token: event.remoteToken,
            remote_recipient: event.remoteRecipient,
            local_token: event.localToken,
            local_depositor: event.localDepositor,
            max_fee: event.maxFee,
            hook_data: event.hookData,
        },
        nonce,
    );

    let encoded = encode(&intent)?;
    let message_hash = hash(&encoded);

    Ok(Reconstruction {
        intent,
        event_index: log.log_index,
        encoded: encoded.into(),
        message_hash,
    })
}

/// [`reconstruct`] against the HTTP endpoint in `options.rpc_url`.
pub async fn reconstruct_from_rpc(
    tx_hash: TxHash,
    options: &ReconstructOptions,
) -> Result<Reconstruction, ReconstructError> {
    let reader = http_reader(options.rpc_url.clone());
    reconstruct(&reader, tx_hash, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Log, LogData, U256, address, b256};
    use intent_codec::{DEPOSIT_INTENT_PREFIX_LEN, message_hash, recipient_id};

    const RESERVE: Address = address!("008888878f94C0d87defdf0B07f46B93C1934442");
    const USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");
    const DEPOSITOR: Address = address!("00000000000000000000000000000000000000aa");
    const TX_HASH: TxHash =
        b256!("d1ad545d00f14e8ccba3c325366933a3391e049ea0a2a9327f2688c3851a33f8");

    struct MockChain {
        tx: Option<ChainTransaction>,
        logs: Option<Vec<ReceiptLog>>,
    }

    impl MockChain {
        fn new(to: Option<Address>, logs: Vec<ReceiptLog>) -> Self {
            Self {
                tx: Some(ChainTransaction { to }),
                logs: Some(logs),
            }
        }
    }

    impl ChainReader for MockChain {
        async fn transaction(
            &self,
            _tx_hash: TxHash,
        ) -> Result<Option<ChainTransaction>, ReconstructError> {
            Ok(self.tx)
        }

        async fn receipt_logs(
            &self,
            _tx_hash: TxHash,
        ) -> Result<Option<Vec<ReceiptLog>>, ReconstructError> {
            Ok(self.logs.clone())
        }
    }

    fn deposit_event(amount: u64, hook_data: Bytes) -> DepositedToRemote {
        DepositedToRemote {
            localToken: USDC,
            value: U256::from(amount),
            localDepositor: DEPOSITOR,
            remoteRecipient: recipient_id("alice::1220f00d"),
            remoteDomain: 10001,
            remoteToken: b256!("74ed63088c070c8fd5d8ad71f2a1cef868c63d00e0ac6dc2a6722d171691a422"),
            maxFee: U256::ZERO,
            hookData: hook_data,
        }
    }

    fn receipt_log(log_index: u64, address: Address, data: LogData) -> ReceiptLog {
        ReceiptLog {
            log_index,
            inner: Log { address, data },
        }
    }

    /// Approval and transfer from the token, then the deposit from the reserve.
    fn deposit_receipt(event: &DepositedToRemote) -> Vec<ReceiptLog> {
        let erc20 = |topic: u8| {
            LogData::new_unchecked(
                vec![B256::repeat_byte(topic)],
                Bytes::from(U256::from(1u64).to_be_bytes::<32>().to_vec()),
            )
        };
        vec![
            receipt_log(1126, USDC, erc20(0x8c)),
            receipt_log(1127, USDC, erc20(0xdd)),
            receipt_log(1128, RESERVE, event.encode_log_data()),
        ]
    }

    fn options(event_index: Option<u64>) -> ReconstructOptions {
        ReconstructOptions {
            event_index,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reconstructs_deposit() {
        let chain = MockChain::new(
            Some(RESERVE),
            deposit_receipt(&deposit_event(1_000_001, Bytes::new())),
        );

        let result = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap();
        let intent = &result.intent;

        assert_eq!(result.event_index, 1128);
        assert_eq!(intent.amount(), U256::from(1_000_001u64));
        assert_eq!(intent.remote_domain(), 10001);
        assert_eq!(intent.local_token(), USDC);
        assert_eq!(intent.local_depositor(), DEPOSITOR);
        assert_eq!(intent.remote_recipient(), recipient_id("alice::1220f00d"));
        assert_eq!(intent.hook_data(), None);
        assert_eq!(
            intent.nonce(),
            b256!("10a58118ad58610fef60b36a157691a70c42fd1fb00a037b6af95567cffd9861")
        );
        assert_eq!(result.encoded.len(), DEPOSIT_INTENT_PREFIX_LEN);
        assert_eq!(result.message_hash, hash(&result.encoded));
        assert_eq!(result.message_hash, message_hash(intent).unwrap());
    }

    #[tokio::test]
    async fn test_auto_detect_matches_explicit_index() {
        let chain = MockChain::new(
            Some(RESERVE),
            deposit_receipt(&deposit_event(42, Bytes::new())),
        );

        let auto = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap();
        let explicit = reconstruct(&chain, TX_HASH, &options(Some(1128))).await.unwrap();

        assert_eq!(auto, explicit);
    }

    #[tokio::test]
    async fn test_hook_data_preserved() {
        let hook = Bytes::from_static(b"\x01\x02\x03\x04");
        let chain = MockChain::new(
            Some(RESERVE),
            deposit_receipt(&deposit_event(42, hook.clone())),
        );

        let result = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap();

        assert_eq!(result.intent.hook_data(), Some(&hook));
        assert_eq!(result.encoded.len(), DEPOSIT_INTENT_PREFIX_LEN + 4);
        assert_eq!(&result.encoded[DEPOSIT_INTENT_PREFIX_LEN..], &hook[..]);
    }

    #[tokio::test]
    async fn test_source_domain_changes_nonce() {
        let chain = MockChain::new(
            Some(RESERVE),
            deposit_receipt(&deposit_event(42, Bytes::new())),
        );

        let domain_0 = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap();
        let domain_7 = reconstruct(
            &chain,
            TX_HASH,
            &ReconstructOptions {
                source_domain: 7,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(domain_7.intent.nonce(), derive_nonce(7, TX_HASH, 1128));
        assert_ne!(domain_0.intent.nonce(), domain_7.intent.nonce());
        assert_ne!(domain_0.message_hash, domain_7.message_hash);
    }

    #[tokio::test]
    async fn test_batch_requires_event_index() {
        let mut logs = deposit_receipt(&deposit_event(1, Bytes::new()));
        logs.push(receipt_log(1129, RESERVE, deposit_event(2, Bytes::new()).encode_log_data()));
        let chain = MockChain::new(Some(RESERVE), logs);

        let err = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            ReconstructError::AmbiguousLog { ref candidates, .. } if candidates == &[1128, 1129]
        ));

        let first = reconstruct(&chain, TX_HASH, &options(Some(1128))).await.unwrap();
        let second = reconstruct(&chain, TX_HASH, &options(Some(1129))).await.unwrap();
        assert_eq!(first.intent.amount(), U256::from(1u64));
        assert_eq!(second.intent.amount(), U256::from(2u64));
        assert_ne!(first.intent.nonce(), second.intent.nonce());
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let chain = MockChain { tx: None, logs: None };
        let err = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap_err();
        assert!(matches!(err, ReconstructError::TransactionNotFound(missing) if missing == TX_HASH));
    }

    #[tokio::test]
    async fn test_contract_creation() {
        let chain = MockChain::new(None, deposit_receipt(&deposit_event(42, Bytes::new())));
        let err = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap_err();
        assert!(matches!(err, ReconstructError::NoRecipient(_)));
    }

    #[tokio::test]
    async fn test_missing_event_index() {
        let chain = MockChain::new(
            Some(RESERVE),
            deposit_receipt(&deposit_event(42, Bytes::new())),
        );
        let err = reconstruct(&chain, TX_HASH, &options(Some(5))).await.unwrap_err();
        assert!(matches!(err, ReconstructError::LogIndexNotFound { index: 5, .. }));
        assert_eq!(err.logs().map(<[_]>::len), Some(3));
    }

    #[tokio::test]
    async fn test_wrong_event_lists_logs() {
        let chain = MockChain::new(
            Some(RESERVE),
            deposit_receipt(&deposit_event(42, Bytes::new())),
        );

        // the token transfer log decodes as something else entirely
        let err = reconstruct(&chain, TX_HASH, &options(Some(1127))).await.unwrap_err();
        assert!(matches!(err, ReconstructError::EventDecode { index: 1127, .. }));

        let listing = err.logs().unwrap();
        assert_eq!(
            listing.iter().map(|log| log.log_index).collect::<Vec<_>>(),
            [1126, 1127, 1128]
        );
        assert_eq!(listing[2].topic0, Some(DepositedToRemote::SIGNATURE_HASH));

        let message = err.to_string();
        assert!(message.contains("Log Index: 1128"));
        assert!(message.contains("not a DepositedToRemote event"));
    }

    #[tokio::test]
    async fn test_oversized_domain_word_rejected() {
        let encoded = deposit_event(42, Bytes::new()).encode_log_data();
        let mut data = encoded.data.to_vec();
        // high byte of the remoteDomain word
        data[32] = 0xff;
        let logs = vec![receipt_log(
            1128,
            RESERVE,
            LogData::new_unchecked(encoded.topics().to_vec(), data.into()),
        )];
        let chain = MockChain::new(Some(RESERVE), logs);

        let err = reconstruct(&chain, TX_HASH, &options(None)).await.unwrap_err();
        assert!(matches!(err, ReconstructError::EventDecode { index: 1128, .. }));
        assert_eq!(err.logs().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_event_signature() {
        assert_eq!(
            DepositedToRemote::SIGNATURE_HASH,
            b256!("2eef4ec627e0f99d1cc55f26e234a6066090b7bc0b3f61245f1f2d7c91d3e563")
        );
    }

    #[test]
    fn test_parse_tx_hash() {
        let valid = "0xd1ad545d00f14e8ccba3c325366933a3391e049ea0a2a9327f2688c3851a33f8";
        assert_eq!(parse_tx_hash(valid).unwrap(), TX_HASH);

        for invalid in [
            "d1ad545d00f14e8ccba3c325366933a3391e049ea0a2a9327f2688c3851a33f8",
            "0xd1ad545d00f14e8ccba3c325366933a3391e049ea0a2a9327f2688c3851a33",
            "0xz1ad545d00f14e8ccba3c325366933a3391e049ea0a2a9327f2688c3851a33f8",
            "",
        ] {
            assert!(matches!(
                parse_tx_hash(invalid),
                Err(ReconstructError::InvalidTxHash(_))
            ));
        }
    }
}
