use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};
use serde::Serialize;
use thiserror::Error;
use crate::address::AddressLayout;
use crate::cache::{AccessOutcome, Cache, CacheTrait, GenericCache};
use crate::config::{CacheConfig, ConfigurationError, ReplacementPolicyConfig};
use crate::hex::{HEX_DIGITS, INVALID_DIGIT};
use crate::replacement_policies::{LeastFrequentlyUsed, LeastRecentlyUsed};

/// The token which terminates a trace. Anything after it is ignored
pub const END_OF_TRACE: &[u8] = b"-1";

/// The simulator replays traces against a cache, and collects results.
///
/// It supports calling simulate multiple times, the cache state, counters and the time taken to
/// simulate carry over between calls
#[derive(Debug)]
pub struct Simulator {
    config: CacheConfig,
    layout: AddressLayout,
    cache: GenericCache,
    simulation_time: Duration,
}

/// A single classified access. Displays as the per-access report line, e.g. `0x10 M`
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AccessRecord {
    pub address: u64,
    pub outcome: AccessOutcome,
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x} {}", self.address, self.outcome)
    }
}

/// The aggregate result of a simulation. Can be serialised for the JSON report
#[derive(Debug, Serialize, PartialEq)]
pub struct SimulationResult {
    pub hits: u64,
    pub misses: u64,
    /// `None` when nothing was accessed
    pub miss_rate: Option<f64>,
    pub total_cycles: u64,
}

impl SimulationResult {
    /// Derives the statistics from the counters and the cycle costs of the configuration
    ///
    /// # Arguments
    ///
    /// * `hits`: The number of hits
    /// * `misses`: The number of misses
    /// * `config`: The configuration providing `hit_time` and `miss_penalty`
    ///
    /// returns: SimulationResult
    pub fn from_counts(hits: u64, misses: u64, config: &CacheConfig) -> Self {
        let accesses = hits + misses;
        // Single precision, then widened, so the printed digits match the C simulator's
        let miss_rate = (accesses != 0).then(|| f64::from(misses as f32 / accesses as f32));
        let total_cycles = accesses
            .saturating_mul(config.hit_time)
            .saturating_add(misses.saturating_mul(config.miss_penalty));
        Self {
            hits,
            misses,
            miss_rate,
            total_cycles,
        }
    }

    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// The summary report line, the miss rate to 6 decimal places followed by the total cycles
///
/// An empty trace reports a miss rate of 0
impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} {}", self.miss_rate.unwrap_or(0.0), self.total_cycles)
    }
}

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("`{token}` (trace entry {position}) is not a 64-bit hexadecimal address")]
    InvalidAddress { token: String, position: usize },
    #[error("couldn't write the access report: {0}")]
    Io(#[from] std::io::Error),
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A cache configuration, from the input's configuration record or from JSON
    ///
    /// returns: Result<Simulator, ConfigurationError>
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        let layout = config.layout()?;
        log::debug!(
            "s = {}, b = {}, t = {}, {:?}",
            layout.set_bits(),
            layout.offset_bits(),
            layout.tag_bits(),
            config.policy
        );
        Ok(Self {
            config: config.clone(),
            layout,
            cache: Self::config_to_cache(config, layout),
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Feeds a single address to the cache
    pub fn access(&mut self, address: u64) -> AccessOutcome {
        self.cache.access(address)
    }

    /// Simulates the cache on a textual trace of hexadecimal addresses separated by whitespace,
    /// writing one report line per access to `out`.
    ///
    /// The trace ends at the first `-1`, or at the end of the input if there is none. Addresses
    /// are parsed in order and each is accessed before the next is parsed, so on an invalid
    /// address the accesses before it have already been applied and reported
    ///
    /// # Arguments
    ///
    /// * `bytes`: The trace, without the configuration record
    /// * `out`: Where the per-access lines are written, use `std::io::sink()` to discard them
    ///
    /// returns: Result<SimulationResult, SimulationError>
    pub fn simulate<W: Write>(&mut self, bytes: &[u8], out: &mut W) -> Result<SimulationResult, SimulationError> {
        let start = Instant::now();
        let mut terminated = false;
        let tokens = bytes
            .split(u8::is_ascii_whitespace)
            .filter(|token| !token.is_empty());
        for (position, token) in tokens.enumerate() {
            if token == END_OF_TRACE {
                terminated = true;
                break;
            }
            let address = parse_address(token).ok_or_else(|| SimulationError::InvalidAddress {
                token: String::from_utf8_lossy(token).into_owned(),
                position,
            })?;
            let outcome = self.access(address);
            writeln!(out, "{}", AccessRecord { address, outcome })?;
        }
        if !terminated {
            log::warn!("the trace ended without the {} sentinel", String::from_utf8_lossy(END_OF_TRACE));
        }
        self.simulation_time += Instant::now() - start;
        Ok(self.result())
    }

    /// The statistics accumulated so far
    pub fn result(&self) -> SimulationResult {
        SimulationResult::from_counts(self.cache.get_hits(), self.cache.get_misses(), &self.config)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of lines which have never been filled
    pub fn get_uninitialised_line_count(&self) -> usize {
        self.cache.get_uninitialised_line_count()
    }

    /// Creates a new cache from a validated configuration
    fn config_to_cache(config: &CacheConfig, layout: AddressLayout) -> GenericCache {
        let lines_per_set = config.lines_per_set as usize;
        match config.policy {
            ReplacementPolicyConfig::LeastRecentlyUsed => {
                GenericCache::from(Cache::new(layout, lines_per_set, LeastRecentlyUsed))
            }
            ReplacementPolicyConfig::LeastFrequentlyUsed => {
                GenericCache::from(Cache::new(layout, lines_per_set, LeastFrequentlyUsed))
            }
        }
    }
}

/// Parses a hexadecimal address, with or without a `0x`/`0X` prefix
///
/// Uses the digit lookup table generated by build.rs. Returns `None` if the token is empty, holds
/// anything other than hex digits after the prefix, or does not fit in 64 bits
///
/// # Arguments
///
/// * `token`: The address as ASCII text
///
/// returns: Option<u64>
///
/// # Examples
///
/// ```
/// use setcache::simulator::parse_address;
/// assert_eq!(parse_address(b"0x1F"), Some(31));
/// assert_eq!(parse_address(b"a0"), Some(160));
/// assert_eq!(parse_address(b"0xZZ"), None);
/// ```
pub fn parse_address(token: &[u8]) -> Option<u64> {
    let digits = match token {
        [b'0', b'x' | b'X', rest @ ..] => rest,
        _ => token,
    };
    if digits.is_empty() {
        return None;
    }
    let mut res: u64 = 0;
    for &byte in digits {
        let digit = HEX_DIGITS[byte as usize];
        // Reject bad digits, and digits which would shift set bits out
        if digit == INVALID_DIGIT || res.leading_zeros() < 4 {
            return None;
        }
        res = res << 4 | digit as u64;
    }
    debug_assert_eq!(
        std::str::from_utf8(digits).ok().and_then(|s| u64::from_str_radix(s, 16).ok()),
        Some(res)
    );
    Some(res)
}
