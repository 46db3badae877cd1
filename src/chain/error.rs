//! Tipos de erro para o cliente de blockchain.
//!
//! Define [`ChainError`] com variantes para rejeição da transação pelo nó,
//! timeout de confirmação, revert e falhas de RPC. Usa `thiserror` para
//! derivar `Display` e `Error` a partir dos atributos `#[error(...)]`.

use alloy::primitives::TxHash;
use thiserror::Error;

/// Erros que podem ocorrer durante uma única tentativa de transação.
///
/// Nenhuma destas variantes é fatal: o driver registra a falha, aguarda o
/// cooldown e tenta a mesma unidade de trabalho novamente.
/// - [`Submission`](ChainError::Submission) — o nó rejeitou a requisição
///   (nonce inválido, saldo insuficiente, falha na estimativa de gas)
/// - [`ConfirmationTimeout`](ChainError::ConfirmationTimeout) — nenhum recibo
///   dentro da janela de espera
/// - [`Reverted`](ChainError::Reverted) — a transação foi incluída mas falhou
/// - [`MissingContractAddress`](ChainError::MissingContractAddress) — deploy
///   confirmado sem endereço de contrato
/// - [`Rpc`](ChainError::Rpc) / [`Http`](ChainError::Http) — falha de transporte
#[derive(Debug, Error)]
pub enum ChainError {
    /// O nó retornou uma resposta de erro JSON-RPC ao enviar a transação.
    #[error("transaction rejected: {0}")]
    Submission(String),

    /// Nenhum recibo foi observado para `tx_hash` dentro de `waited_ms`.
    #[error("no receipt for {tx_hash} after {waited_ms}ms")]
    ConfirmationTimeout { tx_hash: TxHash, waited_ms: u64 },

    /// A transação foi minerada com status de falha.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// Um deploy foi confirmado mas o recibo não traz endereço de contrato.
    #[error("deployment {0} produced no contract address")]
    MissingContractAddress(TxHash),

    /// Falha do nó ou da camada de transporte JSON-RPC.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Falha ao construir o cliente HTTP subjacente.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_display() {
        let err = ChainError::Submission("insufficient funds for gas * price + value".into());
        assert_eq!(
            err.to_string(),
            "transaction rejected: insufficient funds for gas * price + value"
        );
    }

    #[test]
    fn timeout_display_names_the_transaction() {
        let err = ChainError::ConfirmationTimeout {
            tx_hash: TxHash::ZERO,
            waited_ms: 1500,
        };
        let text = err.to_string();
        assert!(text.starts_with("no receipt for 0x0000"));
        assert!(text.ends_with("after 1500ms"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ChainError>();
    }
}
