//! Interface de linha de comando do txfarm baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (deploy, tokens, run)
//! e flags globais que sobrescrevem valores de `txfarm.toml`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::FarmConfig;

/// txfarm — gerador sequencial de transações para redes de teste EVM.
#[derive(Debug, Parser)]
#[command(name = "txfarm", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração (padrão: ./txfarm.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Endpoint JSON-RPC a usar nesta sessão.
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Identificador da chain.
    #[arg(long, global = true)]
    pub chain_id: Option<u64>,

    /// Arquivo com a chave privada.
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    /// Número máximo de retentativas por unidade (padrão: ilimitado).
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Imprime o relatório final em JSON.
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    /// Habilita logs detalhados (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Faz deploys repetidos de um contrato simples.
    Deploy {
        /// Quantidade de deploys.
        #[arg(long)]
        count: Option<u32>,
    },

    /// Faz deploy de tokens e distribui o supply entre endereços aleatórios.
    Tokens {
        /// Número máximo de tokens (a quantidade é sorteada em [1, N]).
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Quantidade de destinatários por token.
        #[arg(long)]
        recipients: Option<u32>,
    },

    /// Executa as duas fases em sequência: contratos e depois tokens.
    Run,
}

impl Cli {
    /// Aplica as flags da CLI sobre a configuração carregada.
    pub fn apply_overrides(&self, config: &mut FarmConfig) {
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(chain_id) = self.chain_id {
            config.chain_id = chain_id;
        }
        if let Some(key_file) = &self.key_file {
            config.key_file = key_file.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = Some(max_retries);
        }

        match &self.command {
            Command::Deploy { count } => {
                if let Some(count) = count {
                    config.deployments = *count;
                }
            }
            Command::Tokens {
                max_tokens,
                recipients,
            } => {
                if let Some(max_tokens) = max_tokens {
                    config.max_tokens = *max_tokens;
                }
                if let Some(recipients) = recipients {
                    config.recipients = *recipients;
                }
            }
            Command::Run => {}
        }
    }
}
