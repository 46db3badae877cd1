use alloy::signers::local::PrivateKeySigner;
use rand::Rng;

use crate::chain::{ChainClient, Payload, UnitKind};
use crate::config::FarmConfig;
use crate::driver::TransactionDriver;
use crate::error::FarmError;
use crate::events::EventSink;
use crate::generator::{RandomTokenGenerator, random_recipients};
use crate::key::load_signer;
use crate::state_machine::RunReport;
use crate::token::TokenCampaign;

/// Which phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Contracts,
    Tokens,
    All,
}

impl Mode {
    fn contracts(self) -> bool {
        matches!(self, Mode::Contracts | Mode::All)
    }

    fn tokens(self) -> bool {
        matches!(self, Mode::Tokens | Mode::All)
    }
}

/// Validate configuration, load the key, connect, then run the requested
/// phases to completion.
///
/// Configuration and key errors are returned before `connect` is called, so
/// a fatal setup problem can never reach the chain.
pub async fn execute<C, S, F>(
    config: &FarmConfig,
    mode: Mode,
    sink: S,
    connect: F,
) -> Result<RunReport, FarmError>
where
    C: ChainClient,
    S: EventSink,
    F: FnOnce(PrivateKeySigner) -> Result<C, FarmError>,
{
    config.validate()?;
    let contract_bytecode = config.contract_bytecode()?;
    let token_bytecode = config.token_bytecode()?;
    let signer = load_signer(&config.key_file)?;
    tracing::info!(address = %signer.address(), rpc_url = %config.rpc_url, "loaded signer");

    let client = connect(signer)?;
    let mut driver = TransactionDriver::new(client, sink, config.retry_policy());
    driver.begin().await;

    if mode.contracts() {
        driver
            .run_sequence(
                UnitKind::ContractDeploy,
                config.deployments,
                &config.pacing(),
                |_| Payload::Deploy {
                    bytecode: contract_bytecode.clone(),
                },
            )
            .await?;
    }

    if mode.tokens() {
        let token_count = rand::rng().random_range(1..=config.max_tokens);
        let generator =
            RandomTokenGenerator::new(config.supply_min, config.supply_max, config.token_decimals)
                .ok_or_else(|| FarmError::Config("token supply does not fit in uint256".into()))?;
        let mut campaign = TokenCampaign::new(
            generator,
            token_bytecode,
            random_recipients(config.recipients),
            config.transfer_pacing(),
        );
        tracing::info!(
            tokens = token_count,
            recipients = campaign.recipients().len(),
            "starting token phase"
        );
        for token in campaign.run(&mut driver, token_count).await? {
            tracing::info!(
                address = %token.address,
                name = %token.name,
                symbol = %token.symbol,
                transfers = token.transfers,
                "token distributed"
            );
        }
    }

    let report = driver.finish();
    tracing::info!(
        completed = report.completed,
        failed_attempts = report.failed_attempts,
        spent = ?report.balance_spent(),
        "run finished"
    );
    Ok(report)
}
