//! Configuração do txfarm carregada a partir de `txfarm.toml`.
//!
//! A struct [`FarmConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam os defaults da rede de testes 0G Galileo.
//! As variáveis de ambiente `TXFARM_RPC_URL` e `TXFARM_KEY_FILE` têm precedência
//! sobre o arquivo; flags da CLI têm precedência sobre ambos.

use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::chain::ClientSettings;
use crate::delay::DelayPolicy;
use crate::error::FarmError;
use crate::generator::scale_supply;
use crate::state_machine::RetryPolicy;

/// Nome do arquivo de configuração procurado no diretório atual.
pub const DEFAULT_CONFIG_FILE: &str = "txfarm.toml";

/// Configuração de nível superior carregada de `txfarm.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    /// URL do endpoint JSON-RPC.
    pub rpc_url: String,
    /// Identificador da chain usado ao assinar transações.
    pub chain_id: u64,
    /// Nome da rede exibido no terminal.
    pub network_name: String,
    /// Símbolo da moeda nativa exibido junto ao saldo.
    pub native_symbol: String,
    /// Arquivo contendo a chave privada em hexadecimal.
    pub key_file: PathBuf,

    /// Quantidade de deploys de contrato simples.
    pub deployments: u32,
    /// Atraso mínimo entre unidades confirmadas, em milissegundos.
    pub delay_min_ms: u64,
    /// Atraso máximo entre unidades confirmadas, em milissegundos.
    pub delay_max_ms: u64,
    /// Pausa fixa após uma tentativa falha.
    pub cooldown_ms: u64,
    /// Máximo de retentativas por unidade. Ausente = tentar para sempre.
    pub max_retries: Option<u32>,

    /// Número máximo de tokens; a quantidade real é sorteada em `[1, max_tokens]`.
    pub max_tokens: u32,
    /// Quantos endereços aleatórios recebem cada token.
    pub recipients: u32,
    /// Supply mínimo em unidades inteiras.
    pub supply_min: u64,
    /// Supply máximo em unidades inteiras.
    pub supply_max: u64,
    /// Casas decimais usadas para escalar o supply.
    pub token_decimals: u8,
    /// Pausa fixa entre transferências de um mesmo token.
    pub transfer_delay_ms: u64,

    /// Tempo máximo de espera por um recibo.
    pub confirmation_timeout_secs: u64,
    /// Intervalo entre consultas de recibo.
    pub poll_interval_ms: u64,

    /// Bytecode do contrato simples (hex). `0x` faz um deploy vazio.
    pub contract_bytecode: String,
    /// Bytecode do token (hex); os argumentos do construtor são anexados.
    pub token_bytecode: String,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://evmrpc-testnet.0g.ai".to_string(),
            chain_id: 80087,
            network_name: "0G Galileo".to_string(),
            native_symbol: "OG".to_string(),
            key_file: PathBuf::from("privatekey.txt"),
            deployments: 120,
            delay_min_ms: 2000,
            delay_max_ms: 20000,
            cooldown_ms: 5000,
            max_retries: None,
            max_tokens: 10,
            recipients: 20,
            supply_min: 100_000,
            supply_max: 1_000_000,
            token_decimals: 18,
            transfer_delay_ms: 1000,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 1000,
            contract_bytecode: "0x".to_string(),
            token_bytecode: "0x".to_string(),
        }
    }
}

impl FarmConfig {
    /// Carrega a configuração de `path`, ou de `txfarm.toml` no diretório atual.
    /// Usa valores padrão se o arquivo padrão não existir; um caminho explícito
    /// inexistente é erro.
    pub fn load(path: Option<&Path>) -> Result<Self, FarmError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        // Variáveis de ambiente têm precedência sobre o arquivo.
        if let Ok(url) = std::env::var("TXFARM_RPC_URL")
            && !url.is_empty()
        {
            config.rpc_url = url;
        }
        if let Ok(key_file) = std::env::var("TXFARM_KEY_FILE")
            && !key_file.is_empty()
        {
            config.key_file = PathBuf::from(key_file);
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, FarmError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<FarmConfig>(&contents)?)
    }

    /// Rejeita combinações que impediriam qualquer execução útil.
    pub fn validate(&self) -> Result<(), FarmError> {
        let invalid = |msg: String| Err(FarmError::Config(msg));

        if self.rpc_url.trim().is_empty() {
            return invalid("rpc_url must not be empty".into());
        }
        if let Err(e) = self.rpc_url.parse::<reqwest::Url>() {
            return invalid(format!("rpc_url {:?} is not a valid URL: {e}", self.rpc_url));
        }
        if self.deployments == 0 {
            return invalid("deployments must be at least 1".into());
        }
        if self.delay_min_ms > self.delay_max_ms {
            return invalid(format!(
                "delay_min_ms ({}) is greater than delay_max_ms ({})",
                self.delay_min_ms, self.delay_max_ms
            ));
        }
        if self.max_tokens == 0 {
            return invalid("max_tokens must be at least 1".into());
        }
        if self.recipients == 0 {
            return invalid("recipients must be at least 1".into());
        }
        if self.supply_min == 0 || self.supply_min > self.supply_max {
            return invalid(format!(
                "supply range [{}, {}] must be positive and ordered",
                self.supply_min, self.supply_max
            ));
        }
        if scale_supply(self.supply_max, self.token_decimals).is_none() {
            return invalid(format!(
                "supply_max ({}) with token_decimals ({}) does not fit in uint256",
                self.supply_max, self.token_decimals
            ));
        }
        if self.confirmation_timeout_secs == 0 {
            return invalid("confirmation_timeout_secs must be at least 1".into());
        }
        self.contract_bytecode()?;
        self.token_bytecode()?;
        Ok(())
    }

    pub fn contract_bytecode(&self) -> Result<Bytes, FarmError> {
        parse_bytecode("contract_bytecode", &self.contract_bytecode)
    }

    pub fn token_bytecode(&self) -> Result<Bytes, FarmError> {
        parse_bytecode("token_bytecode", &self.token_bytecode)
    }

    pub fn pacing(&self) -> DelayPolicy {
        DelayPolicy::new(self.delay_min_ms, self.delay_max_ms)
    }

    pub fn transfer_pacing(&self) -> DelayPolicy {
        DelayPolicy::fixed(self.transfer_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            cooldown_ms: self.cooldown_ms,
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            chain_id: self.chain_id,
            confirmation_timeout: Duration::from_secs(self.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

fn parse_bytecode(field: &str, hex: &str) -> Result<Bytes, FarmError> {
    hex.trim()
        .parse::<Bytes>()
        .map_err(|e| FarmError::Config(format!("{field} is not valid hex: {e}")))
}
