use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportError;
use alloy::transports::http::Http;
use chrono::{DateTime, Utc};
use tokio::time::{sleep, timeout};

use super::calls::{token_deploy_code, transfer_calldata};
use super::error::ChainError;
use super::types::{Confirmation, Payload, PendingHandle};

/// Capability the driver needs from a chain: send one transaction, wait for
/// it, and read the sender's balance.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    async fn submit(&self, payload: &Payload) -> Result<PendingHandle, ChainError>;

    async fn await_confirmation(&self, handle: PendingHandle) -> Result<Confirmation, ChainError>;

    async fn balance(&self) -> Result<U256, ChainError>;
}

/// Timeouts applied by [`AlloyChainClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub chain_id: u64,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
}

/// JSON-RPC chain client backed by an alloy provider with a local wallet.
///
/// Nonce, gas and signing are filled by the provider; this type only builds
/// requests and turns receipts into [`Confirmation`]s.
pub struct AlloyChainClient {
    provider: DynProvider,
    address: Address,
    settings: ClientSettings,
}

impl AlloyChainClient {
    pub fn connect(
        rpc_url: &str,
        signer: PrivateKeySigner,
        settings: ClientSettings,
    ) -> Result<Self, ChainError> {
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|e| ChainError::Rpc(format!("invalid RPC URL {rpc_url}: {e}")))?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        let transport = Http::with_client(http, url);
        let is_local = transport.guess_local();

        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(RpcClient::new(transport, is_local))
            .erased();

        Ok(Self {
            provider,
            address,
            settings,
        })
    }

    fn build_request(&self, payload: &Payload) -> TransactionRequest {
        let request = TransactionRequest::default()
            .with_from(self.address)
            .with_chain_id(self.settings.chain_id);

        match payload {
            Payload::Deploy { bytecode } => request.with_deploy_code(bytecode.clone()),
            Payload::DeployToken { bytecode, token } => {
                request.with_deploy_code(token_deploy_code(bytecode, token))
            }
            Payload::Transfer { token, to, amount } => request
                .with_to(*token)
                .with_input(transfer_calldata(*to, *amount)),
        }
    }

    async fn poll_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(rpc_error)?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            sleep(self.settings.poll_interval).await;
        }
    }

    async fn block_timestamp(&self, number: u64) -> Result<DateTime<Utc>, ChainError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(rpc_error)?
            .ok_or_else(|| ChainError::Rpc(format!("block {number} not found")))?;

        let seconds = i64::try_from(block.header.timestamp)
            .map_err(|_| ChainError::Rpc(format!("block {number} timestamp out of range")))?;
        DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| ChainError::Rpc(format!("block {number} timestamp out of range")))
    }
}

impl ChainClient for AlloyChainClient {
    async fn submit(&self, payload: &Payload) -> Result<PendingHandle, ChainError> {
        let request = self.build_request(payload);
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(submission_error)?;

        let tx_hash = *pending.tx_hash();
        tracing::debug!(%tx_hash, kind = %payload.kind(), "transaction accepted by node");
        Ok(PendingHandle {
            tx_hash,
            kind: payload.kind(),
        })
    }

    async fn await_confirmation(&self, handle: PendingHandle) -> Result<Confirmation, ChainError> {
        let waited = self.settings.confirmation_timeout;
        let receipt = timeout(waited, self.poll_receipt(handle.tx_hash))
            .await
            .map_err(|_| ChainError::ConfirmationTimeout {
                tx_hash: handle.tx_hash,
                waited_ms: waited.as_millis() as u64,
            })??;

        tracing::debug!(tx_hash = %handle.tx_hash, kind = %handle.kind, "receipt received");
        if !receipt.status() {
            return Err(ChainError::Reverted(handle.tx_hash));
        }

        let block_number = receipt.block_number.ok_or_else(|| {
            ChainError::Rpc(format!("receipt for {} has no block", handle.tx_hash))
        })?;
        let timestamp = self.block_timestamp(block_number).await?;

        Ok(Confirmation {
            address: receipt.contract_address,
            tx_hash: receipt.transaction_hash,
            block_number,
            gas_used: receipt.gas_used,
            timestamp,
        })
    }

    async fn balance(&self) -> Result<U256, ChainError> {
        self.provider
            .get_balance(self.address)
            .await
            .map_err(rpc_error)
    }
}

// An error response from the node means it refused the transaction; anything
// else is a transport problem.
fn submission_error(err: TransportError) -> ChainError {
    if err.as_error_resp().is_some() {
        ChainError::Submission(err.to_string())
    } else {
        ChainError::Rpc(err.to_string())
    }
}

fn rpc_error(err: TransportError) -> ChainError {
    ChainError::Rpc(err.to_string())
}
