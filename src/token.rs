use alloy::primitives::{Address, Bytes};

use crate::chain::{ChainClient, Confirmation, Payload, UnitKind};
use crate::delay::DelayPolicy;
use crate::driver::TransactionDriver;
use crate::error::FarmError;
use crate::events::{DriverEvent, EventSink};
use crate::generator::{TokenGenerator, distribution_amount};

/// A token that was deployed and distributed.
#[derive(Debug, Clone)]
pub struct DeployedToken {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub transfers: usize,
}

/// Token mode: deploy `count` tokens and split each one's supply evenly
/// across the same recipient list.
pub struct TokenCampaign<G> {
    generator: G,
    bytecode: Bytes,
    recipients: Vec<Address>,
    transfer_pacing: DelayPolicy,
}

impl<G: TokenGenerator> TokenCampaign<G> {
    pub fn new(
        generator: G,
        bytecode: Bytes,
        recipients: Vec<Address>,
        transfer_pacing: DelayPolicy,
    ) -> Self {
        Self {
            generator,
            bytecode,
            recipients,
            transfer_pacing,
        }
    }

    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    /// Deploy and distribute `count` tokens in sequence.
    ///
    /// Each deployment is its own unit; once it is confirmed with a contract
    /// address its transfers run as a sequence of units. A deployment whose
    /// receipt has no address is retried. A failed transfer retries only that
    /// transfer, never the deployment.
    pub async fn run<C, S>(
        &mut self,
        driver: &mut TransactionDriver<C, S>,
        count: u32,
    ) -> Result<Vec<DeployedToken>, FarmError>
    where
        C: ChainClient,
        S: EventSink,
    {
        driver.announce(UnitKind::TokenDeploy, count);
        let recipient_count = self.recipients.len() as u32;

        let mut deployed = Vec::with_capacity(count as usize);
        for index in 1..=count {
            let token = self.generator.next_token();
            let payload = Payload::DeployToken {
                bytecode: self.bytecode.clone(),
                token: token.clone(),
            };
            let mut unit = driver.unit(index, payload);
            let address = driver
                .drive_unit_with(&mut unit, count, Confirmation::contract_address)
                .await?;

            let amount = distribution_amount(token.supply, recipient_count);
            driver.emit(DriverEvent::TokenDeployed {
                address,
                symbol: token.symbol.clone(),
                decimals: token.decimals,
                amount_per_recipient: amount,
                recipients: recipient_count,
            });

            let recipients = &self.recipients;
            let transfers = driver
                .run_sequence(UnitKind::Transfer, recipient_count, &self.transfer_pacing, |i| {
                    Payload::Transfer {
                        token: address,
                        to: recipients[(i - 1) as usize],
                        amount,
                    }
                })
                .await?;

            deployed.push(DeployedToken {
                address,
                name: token.name,
                symbol: token.symbol,
                transfers: transfers.len(),
            });
        }

        Ok(deployed)
    }
}
