use serde::Deserialize;
use thiserror::Error;
use crate::address::AddressLayout;
use crate::cache::storage_bytes;

/// A configuration for a single set-associative cache
///
/// Can be read from the leading record of a text input (see [`crate::io::split_config_record`])
/// or from JSON
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct CacheConfig {
    /// `S`, the number of sets. Must be a power of two
    pub sets: u64,
    /// `E`, the number of lines in each set
    pub lines_per_set: u64,
    /// `B`, the block size in bytes. Must be a power of two
    pub block_size: u64,
    /// `m`, the address width in bits
    pub address_bits: u32,
    #[serde(default = "ReplacementPolicyConfig::default")]
    pub policy: ReplacementPolicyConfig,
    pub hit_time: u64,
    pub miss_penalty: u64,
}

/// The replacement policy - lru or lfu
///
/// Any token other than `lru` (ignoring case) selects least frequently used. There is no error for
/// an unknown policy; traces recorded against the C simulator depend on this fallback
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum ReplacementPolicyConfig {
    LeastRecentlyUsed,
    LeastFrequentlyUsed,
}

impl ReplacementPolicyConfig {
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("lru") {
            ReplacementPolicyConfig::LeastRecentlyUsed
        } else {
            ReplacementPolicyConfig::LeastFrequentlyUsed
        }
    }
}

impl Default for ReplacementPolicyConfig {
    fn default() -> Self {
        ReplacementPolicyConfig::LeastFrequentlyUsed
    }
}

impl From<String> for ReplacementPolicyConfig {
    fn from(value: String) -> Self {
        Self::from_token(&value)
    }
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ConfigurationError {
    #[error("the number of sets must be a power of two, got {0}")]
    SetsNotPowerOfTwo(u64),
    #[error("the block size must be a power of two, got {0}")]
    BlockSizeNotPowerOfTwo(u64),
    #[error("each set needs at least one line")]
    NoLinesPerSet,
    #[error("addresses wider than 64 bits are not supported, got {0}")]
    AddressTooWide(u32),
    #[error("{address_bits} address bits can't hold {set_bits} set bits and {offset_bits} offset bits")]
    AddressTooNarrow { address_bits: u32, set_bits: u32, offset_bits: u32 },
    #[error("{sets} sets of {lines_per_set} lines are too large to allocate")]
    CacheTooLarge { sets: u64, lines_per_set: u64 },
}

impl CacheConfig {
    /// Validates the configuration and derives the address partition `(s, b, t)` from it
    pub fn layout(&self) -> Result<AddressLayout, ConfigurationError> {
        if !self.sets.is_power_of_two() {
            return Err(ConfigurationError::SetsNotPowerOfTwo(self.sets));
        }
        if !self.block_size.is_power_of_two() {
            return Err(ConfigurationError::BlockSizeNotPowerOfTwo(self.block_size));
        }
        if self.lines_per_set == 0 {
            return Err(ConfigurationError::NoLinesPerSet);
        }
        if storage_bytes(self.sets, self.lines_per_set).is_none() {
            return Err(ConfigurationError::CacheTooLarge {
                sets: self.sets,
                lines_per_set: self.lines_per_set,
            });
        }
        if self.address_bits > u64::BITS {
            return Err(ConfigurationError::AddressTooWide(self.address_bits));
        }
        // Both are powers of two, so this is log2
        let set_bits = self.sets.trailing_zeros();
        let offset_bits = self.block_size.trailing_zeros();
        let tag_bits = self.address_bits
            .checked_sub(set_bits + offset_bits)
            .ok_or(ConfigurationError::AddressTooNarrow {
                address_bits: self.address_bits,
                set_bits,
                offset_bits,
            })?;
        Ok(AddressLayout::new(set_bits, offset_bits, tag_bits))
    }
}
