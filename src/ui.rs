//! Interface de terminal do txfarm — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para o spinner enquanto uma transação aguarda
//! confirmação e `console` para estilização com cores. O [`ConsoleReporter`]
//! é apenas um assinante do fluxo de eventos do driver.

use alloy::primitives::{Address, U256};
use alloy::primitives::utils::{format_ether, format_units};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::chain::{UnitKind, types::short_address};
use crate::events::{DriverEvent, EventSink, WaitReason};
use crate::state_machine::RunReport;

/// Imprime o progresso da execução no terminal.
///
/// Sucesso em verde, falha em vermelho e pausas em amarelo; um spinner fica
/// ativo entre o envio e a confirmação de cada transação.
pub struct ConsoleReporter {
    // Nome da rede e símbolo da moeda nativa para as mensagens.
    network: String,
    native_symbol: String,
    // Spinner ativo enquanto uma transação aguarda confirmação.
    spinner: Option<ProgressBar>,
    green: Style,
    red: Style,
    yellow: Style,
    dim: Style,
}

impl ConsoleReporter {
    pub fn new(network: &str, native_symbol: &str) -> Self {
        Self {
            network: network.to_string(),
            native_symbol: native_symbol.to_string(),
            spinner: None,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    fn start_spinner(&mut self, message: String) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn stop_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn balance(&self, balance: U256) -> String {
        format!("{} {}", format_ether(balance), self.native_symbol)
    }

    /// Imprime o relatório final formatado em JSON.
    pub fn print_report(&self, report: &RunReport) -> serde_json::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        println!();
        println!("{}", self.green.apply_to("─── Run Report ───"));
        println!("{json}");
        Ok(())
    }
}

impl EventSink for ConsoleReporter {
    fn emit(&mut self, event: &DriverEvent) {
        match event {
            DriverEvent::Started { kind, total } => match kind {
                UnitKind::ContractDeploy => println!(
                    "\nStarting mass deployment ({total} contracts) on {}\n",
                    self.network
                ),
                UnitKind::TokenDeploy => {
                    println!("\n=== TOKEN DEPLOYMENT ({total} tokens) ===")
                }
                UnitKind::Transfer => {}
            },
            DriverEvent::Attempt {
                kind,
                index,
                total,
                attempt,
                label,
            } => {
                let retry = if *attempt > 1 {
                    format!(" (attempt {attempt})")
                } else {
                    String::new()
                };
                match kind {
                    UnitKind::Transfer => {}
                    UnitKind::TokenDeploy => {
                        println!("\n[{index}/{total}] Deploying {label}{retry}")
                    }
                    UnitKind::ContractDeploy => {
                        println!("[{index}/{total}] Preparing deployment...{retry}")
                    }
                }
            }
            DriverEvent::Submitted { index, tx_hash } => {
                self.start_spinner(format!("[{index}] Waiting for confirmation of {tx_hash}"));
            }
            DriverEvent::Confirmed {
                kind,
                index,
                total,
                recipient,
                confirmation,
            } => {
                self.stop_spinner();
                match kind {
                    UnitKind::Transfer => println!(
                        "  [{index}/{total}] {} (TX: {}, block {})",
                        transfer_line(recipient.as_ref()),
                        confirmation.tx_hash,
                        confirmation.block_number
                    ),
                    _ => {
                        println!("{} Deployment successful!", self.green.apply_to("✓"));
                        if let Some(address) = confirmation.address {
                            println!("  Contract address: {address}");
                        }
                        println!("  TX hash: {}", confirmation.tx_hash);
                        println!("  Block: {}", confirmation.block_number);
                        println!("  Gas used: {}", confirmation.gas_used);
                        println!("  Timestamp: {}", confirmation.timestamp.to_rfc3339());
                    }
                }
            }
            DriverEvent::Balance { balance } => {
                println!(
                    "{}",
                    self.dim
                        .apply_to(format!("Balance: {}", self.balance(*balance)))
                );
            }
            DriverEvent::Failed {
                kind,
                index,
                total,
                attempt,
                reason,
            } => {
                self.stop_spinner();
                eprintln!(
                    "  {} {kind} {index}/{total} failed on attempt {attempt}: {reason}",
                    self.red.apply_to("✗")
                );
            }
            DriverEvent::Waiting { reason, delay_ms } => match reason {
                WaitReason::Pacing if *delay_ms >= 1000 => println!(
                    "\n{}\n",
                    self.yellow.apply_to(format!(
                        "Waiting {} seconds before next transaction...",
                        *delay_ms as f64 / 1000.0
                    ))
                ),
                WaitReason::Pacing => {}
                WaitReason::Cooldown => eprintln!(
                    "  {} Retrying in {delay_ms}ms",
                    self.yellow.apply_to("↻")
                ),
            },
            DriverEvent::TokenDeployed {
                address,
                symbol,
                decimals,
                amount_per_recipient,
                recipients,
            } => {
                println!("Token deployed: {address}");
                println!(
                    "Distributing {} {symbol} to {recipients} addresses",
                    token_amount(*amount_per_recipient, *decimals)
                );
            }
            DriverEvent::Finished {
                total_gas_used,
                initial_balance,
                final_balance,
            } => {
                self.stop_spinner();
                println!("\n{} All deployments completed!", self.green.apply_to("✓"));
                println!("  Total gas used: {total_gas_used}");
                if let Some(initial) = initial_balance {
                    println!("  Initial balance: {}", self.balance(*initial));
                }
                if let Some(last) = final_balance {
                    println!("  Final balance: {}", self.balance(*last));
                }
            }
        }
    }
}

fn transfer_line(recipient: Option<&Address>) -> String {
    match recipient {
        Some(to) => format!("Sent to {}", short_address(to)),
        None => "Sent".to_string(),
    }
}

// Valor em unidades inteiras do token, segundo suas casas decimais.
fn token_amount(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}
