//! Randomized token parameters and recipient lists.
//!
//! [`TokenGenerator`] is the seam the token campaign pulls specs from;
//! [`RandomTokenGenerator`] produces space-themed names, symbols derived
//! from the name, and a supply scaled to the token's decimals.

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::chain::TokenSpec;

const PREFIXES: &[&str] = &[
    "Galileo", "Cosmic", "Stellar", "Nebula", "Orbital", "Quantum", "ZeroG", "Astro", "Lunar",
    "Solar", "Photon", "Pulsar", "DarkMatter", "Singularity", "Hyper", "Interstellar", "Infinity",
    "Celestial", "Void", "Eclipse", "Nova", "Supernova", "Andromeda",
];

const SUFFIXES: &[&str] = &[
    "Token", "Coin", "Dollar", "Credit", "Fuel", "Gem", "Crystal", "Particle", "Wave", "Bit",
    "Byte", "Protocol", "Network", "Share", "Note", "Bond", "Trust", "Vault",
];

const SPECIAL_NAMES: &[&str] = &[
    "Warp Drive",
    "Black Hole",
    "Event Horizon",
    "Cosmic Dust",
    "Space Time",
    "Dark Energy",
    "The Final Frontier",
];

// I and O are left out so symbols don't read as digits.
const SYMBOL_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Source of token constructor parameters.
pub trait TokenGenerator {
    fn next_token(&mut self) -> TokenSpec;
}

/// Generates names, symbols and supplies from the thread-local RNG.
#[derive(Debug, Clone)]
pub struct RandomTokenGenerator {
    supply_min: u64,
    supply_max: u64,
    decimals: u8,
    // 10^decimals
    unit: U256,
}

impl RandomTokenGenerator {
    /// Returns `None` when `supply_max` whole tokens at `decimals` do not fit
    /// in a `uint256`.
    pub fn new(supply_min: u64, supply_max: u64, decimals: u8) -> Option<Self> {
        scale_supply(supply_max, decimals)?;
        Some(Self {
            supply_min,
            supply_max,
            decimals,
            unit: scale_supply(1, decimals)?,
        })
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn next_token(&mut self) -> TokenSpec {
        let mut rng = rand::rng();
        let name = generate_name(&mut rng);
        let symbol = derive_symbol(&name, &mut rng);
        let whole = rng.random_range(self.supply_min..=self.supply_max);
        TokenSpec {
            name,
            symbol,
            // whole <= supply_max, which new() checked fits
            supply: U256::from(whole).saturating_mul(self.unit),
            decimals: self.decimals,
        }
    }
}

/// Picks a token name: 20% a multi-word special name, otherwise a prefix and
/// suffix either spaced ("Nova Coin") or joined ("NovaCoin").
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    if rng.random_bool(0.2) {
        return pick(SPECIAL_NAMES, rng).to_string();
    }

    let prefix = pick(PREFIXES, rng);
    let suffix = pick(SUFFIXES, rng);
    if rng.random_bool(0.5) {
        format!("{prefix} {suffix}")
    } else {
        format!("{prefix}{suffix}")
    }
}

fn pick<'a, R: Rng + ?Sized>(words: &[&'a str], rng: &mut R) -> &'a str {
    words.choose(rng).copied().unwrap_or("Token")
}

/// Multi-word names become their uppercase initials; single words get a
/// random 3-letter (70%) or 4-letter (30%) symbol.
pub fn derive_symbol<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() > 1 {
        return words
            .iter()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect();
    }

    let length = if rng.random_bool(0.3) { 4 } else { 3 };
    (0..length)
        .map(|_| char::from(SYMBOL_LETTERS[rng.random_range(0..SYMBOL_LETTERS.len())]))
        .collect()
}

/// `whole * 10^decimals` as a token base-unit amount, or `None` if that
/// overflows a `uint256`.
pub fn scale_supply(whole: u64, decimals: u8) -> Option<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))?
        .checked_mul(U256::from(whole))
}

/// Per-recipient share of `supply`. Integer division; the remainder stays
/// with the deployer.
pub fn distribution_amount(supply: U256, recipients: u32) -> U256 {
    if recipients == 0 {
        return U256::ZERO;
    }
    supply / U256::from(recipients)
}

/// Fresh random addresses, one per recipient.
pub fn random_recipients(count: u32) -> Vec<Address> {
    (0..count)
        .map(|_| PrivateKeySigner::random().address())
        .collect()
}
