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

use alloy::transports::http::reqwest::Url;
use alloy_primitives::TxHash;
use anyhow::{Context, Result};
use clap::Parser;
use intent_host::{
    DEFAULT_RPC_URL, DEFAULT_SOURCE_DOMAIN, ReconstructOptions, parse_tx_hash,
    reconstruct_from_rpc,
};
use tracing_subscriber::EnvFilter;

/// Derive the message hash of a deposit intent from the transaction that created it.
///
/// Fetches the deposit transaction, decodes its `DepositedToRemote` event, derives the
/// nonce and prints the canonical encoding together with its hash.
#[derive(Parser)]
struct Args {
    /// Transaction hash of the deposit on the source chain (0x + 64 hex characters)
    #[arg(env = "TX_HASH", value_parser = parse_tx_hash)]
    tx_hash: TxHash,

    /// Source chain RPC endpoint URL
    #[arg(long = "rpc", env = "ETH_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: Url,

    /// Domain id of the source chain, part of the nonce preimage
    #[arg(long = "domain", env = "SOURCE_DOMAIN", default_value_t = DEFAULT_SOURCE_DOMAIN)]
    source_domain: u32,

    /// Log index of the deposit event.
    ///
    /// Auto-detected from the called contract when omitted. Required when the
    /// transaction emitted several deposits or went through an intermediate contract.
    #[arg(long, env = "EVENT_INDEX")]
    event_index: Option<u64>,

    /// Print the full reconstruction as JSON instead of the summary lines
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let options = ReconstructOptions {
        rpc_url: args.rpc_url,
        source_domain: args.source_domain,
        event_index: args.event_index,
    };

    let reconstruction = reconstruct_from_rpc(args.tx_hash, &options)
        .await
        .with_context(|| format!("failed to derive deposit intent from {}", args.tx_hash))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reconstruction)?);
    } else {
        println!("Message Hash: {}", reconstruction.message_hash);
        println!("Nonce: {}", reconstruction.intent.nonce());
        println!("Encoded: {}", reconstruction.encoded);
    }

    Ok(())
}
