use std::fs::File;
use std::io::{Read, Write};
use std::ops::Deref;
use thiserror::Error;
use crate::config::{CacheConfig, ReplacementPolicyConfig};
use crate::simulator::SimulationResult;

/// The raw bytes of an input, either memory mapped or read into a buffer
#[derive(Debug)]
pub enum InputBytes {
    #[cfg(unix)]
    Mapped(memmap2::Mmap),
    Buffered(Vec<u8>),
}

impl Deref for InputBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            #[cfg(unix)]
            InputBytes::Mapped(m) => m,
            InputBytes::Buffered(b) => b,
        }
    }
}

pub fn get_input(file: File) -> Result<InputBytes, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        return read_all(file);
    }
    // Memory map the file on unix systems
    #[cfg(unix)]
    {
        use memmap2::{Advice, Mmap};
        let len = file.metadata().map_err(|e| format!("Couldn't read the input's metadata: {e}"))?.len();
        // Mapping an empty file fails
        if len == 0 {
            return Ok(InputBytes::Buffered(Vec::new()));
        }
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(InputBytes::Mapped(m))
        }
    }
}

/// Reads the whole of a stream, for inputs which can't be mapped such as stdin
pub fn read_all<R: Read>(mut reader: R) -> Result<InputBytes, String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(|e| format!("Couldn't read the input: {e}"))?;
    Ok(InputBytes::Buffered(buf))
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum InputError {
    #[error("the configuration record ended before `{0}`")]
    MissingField(&'static str),
    #[error("`{value}` is not a valid value for `{field}`")]
    InvalidField { field: &'static str, value: String },
}

/// Splits the next whitespace separated token from the front of the input
fn next_token(bytes: &[u8]) -> Option<(&[u8], &[u8])> {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace())?;
    let rest = &bytes[start..];
    let end = rest.iter().position(u8::is_ascii_whitespace).unwrap_or(rest.len());
    Some((&rest[..end], &rest[end..]))
}

fn parse_field<T: std::str::FromStr>(token: &[u8], field: &'static str) -> Result<T, InputError> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| InputError::InvalidField {
            field,
            value: String::from_utf8_lossy(token).into_owned(),
        })
}

/// Parses the configuration record at the start of an input, returning it along with the rest of
/// the input, which is the trace
///
/// The record is seven whitespace separated tokens: `S E B m policy hit_time miss_penalty`. The
/// integers are decimal. The record is only parsed here, see [`CacheConfig::layout`] for validation
///
/// # Arguments
///
/// * `bytes`: The whole input
///
/// returns: Result<(CacheConfig, &[u8]), InputError>
///
/// # Examples
///
/// ```
/// use setcache::io::split_config_record;
/// let (config, trace) = split_config_record(b"4 1 16 16 lru 1 100\n0 10 -1").unwrap();
/// assert_eq!(config.sets, 4);
/// assert_eq!(trace, b"\n0 10 -1");
/// ```
pub fn split_config_record(bytes: &[u8]) -> Result<(CacheConfig, &[u8]), InputError> {
    let mut rest = bytes;
    let mut take = |field: &'static str| {
        let (token, remaining) = next_token(rest).ok_or(InputError::MissingField(field))?;
        rest = remaining;
        Ok::<_, InputError>(token)
    };
    let sets = parse_field(take("S")?, "S")?;
    let lines_per_set = parse_field(take("E")?, "E")?;
    let block_size = parse_field(take("B")?, "B")?;
    let address_bits = parse_field(take("m")?, "m")?;
    let policy = ReplacementPolicyConfig::from_token(&String::from_utf8_lossy(take("policy")?));
    let hit_time = parse_field(take("hit_time")?, "hit_time")?;
    let miss_penalty = parse_field(take("miss_penalty")?, "miss_penalty")?;
    let config = CacheConfig {
        sets,
        lines_per_set,
        block_size,
        address_bits,
        policy,
        hit_time,
        miss_penalty,
    };
    Ok((config, rest))
}

/// Writes the summary line
pub fn write_summary<W: Write>(out: &mut W, result: &SimulationResult) -> std::io::Result<()> {
    if result.miss_rate.is_none() {
        log::warn!("no addresses were accessed, reporting a miss rate of 0");
    }
    writeln!(out, "{result}")
}
