//! Tipos de dados trocados com o cliente de blockchain.
//!
//! [`Payload`] descreve o que uma unidade de trabalho envia para a rede,
//! [`PendingHandle`] identifica uma transação já aceita pelo nó e
//! [`Confirmation`] é o recibo resumido de uma transação incluída em bloco.

use std::fmt;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ChainError;

/// Categoria de uma unidade de trabalho, usada em eventos e relatórios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    ContractDeploy,
    TokenDeploy,
    Transfer,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::ContractDeploy => write!(f, "deployment"),
            UnitKind::TokenDeploy => write!(f, "token deployment"),
            UnitKind::Transfer => write!(f, "transfer"),
        }
    }
}

/// Parâmetros de construtor de um token: nome, símbolo e supply inicial
/// já escalado pelas casas decimais.
///
/// `decimals` não é enviado ao construtor; serve apenas para exibir valores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    pub supply: U256,
    pub decimals: u8,
}

/// A requisição on-chain que uma unidade de trabalho precisa confirmar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Deploy de contrato sem argumentos de construtor.
    Deploy { bytecode: Bytes },
    /// Deploy de token com `(name, symbol, supply)` codificados após o bytecode.
    DeployToken { bytecode: Bytes, token: TokenSpec },
    /// Chamada `transfer(to, amount)` no contrato `token`.
    Transfer {
        token: Address,
        to: Address,
        amount: U256,
    },
}

impl Payload {
    pub fn kind(&self) -> UnitKind {
        match self {
            Payload::Deploy { .. } => UnitKind::ContractDeploy,
            Payload::DeployToken { .. } => UnitKind::TokenDeploy,
            Payload::Transfer { .. } => UnitKind::Transfer,
        }
    }

    /// Destinatário de uma transferência.
    pub fn recipient(&self) -> Option<Address> {
        match self {
            Payload::Transfer { to, .. } => Some(*to),
            _ => None,
        }
    }

    /// Rótulo curto para exibição no terminal.
    pub fn label(&self) -> String {
        match self {
            Payload::Deploy { .. } => "contract deployment".to_string(),
            Payload::DeployToken { token, .. } => format!("{} ({})", token.name, token.symbol),
            Payload::Transfer { to, .. } => format!("transfer to {}", short_address(to)),
        }
    }
}

/// Identifica uma transação aceita pelo nó e ainda não confirmada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHandle {
    pub tx_hash: TxHash,
    pub kind: UnitKind,
}

/// Recibo resumido de uma transação confirmada.
///
/// O `timestamp` vem do cabeçalho do bloco que incluiu a transação,
/// não do relógio local no momento da chamada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Endereço do contrato criado, presente apenas em deploys.
    pub address: Option<Address>,
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub timestamp: DateTime<Utc>,
}

impl Confirmation {
    /// Endereço do contrato criado; um deploy sem endereço conta como falha.
    pub fn contract_address(&self) -> Result<Address, ChainError> {
        self.address.ok_or(ChainError::MissingContractAddress(self.tx_hash))
    }
}

/// Formata um endereço como `0x123456...` para linhas de log compactas.
pub fn short_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...", &full[..8])
}
