//! ABI encoding for token deployments and ERC-20 transfers.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};

use super::types::TokenSpec;

alloy::sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Encodes `transfer(to, amount)` calldata.
pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
    Bytes::from(IERC20::transferCall { to, amount }.abi_encode())
}

/// Returns the token creation code: bytecode followed by the ABI-encoded
/// `(string name, string symbol, uint256 supply)` constructor arguments.
pub fn token_deploy_code(bytecode: &Bytes, token: &TokenSpec) -> Bytes {
    let args = (token.name.clone(), token.symbol.clone(), token.supply).abi_encode_params();

    let mut code = bytecode.to_vec();
    code.extend_from_slice(&args);
    Bytes::from(code)
}
