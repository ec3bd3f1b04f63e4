use std::{fmt, mem};
use crate::address::AddressLayout;
use crate::replacement_policies::{LeastFrequentlyUsed, LeastRecentlyUsed, ReplacementPolicy};

/// The classification of a single access
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AccessOutcome {
    Hit,
    Miss,
}

impl AccessOutcome {
    /// The single character used in per-access reports
    pub fn symbol(&self) -> char {
        match self {
            AccessOutcome::Hit => 'H',
            AccessOutcome::Miss => 'M',
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One cache slot
///
/// Lines start invalid. The first fill makes them valid, and they stay valid from then on; an
/// eviction only replaces the tag
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Line {
    valid: bool,
    tag: u64,
}

impl Line {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The tag held by the line, if it has ever been filled
    pub fn tag(&self) -> Option<u64> {
        self.valid.then_some(self.tag)
    }
}

/// A fixed group of lines, with the per-line counters the replacement policies score
#[derive(Debug, Clone)]
pub struct Set {
    lines: Vec<Line>,
    // Logical time of the last fill of each line
    last_used_at: Vec<u64>,
    // Fills plus hits, accumulated across evictions
    access_counts: Vec<u64>,
    lines_used: usize,
}

impl Set {
    pub fn new(lines_per_set: usize) -> Self {
        Self {
            lines: vec![Line::default(); lines_per_set],
            last_used_at: vec![0; lines_per_set],
            access_counts: vec![0; lines_per_set],
            lines_used: 0,
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn last_used_at(&self) -> &[u64] {
        &self.last_used_at
    }

    pub fn access_counts(&self) -> &[u64] {
        &self.access_counts
    }

    /// The number of fills this set has seen, capped at the associativity
    pub fn lines_used(&self) -> usize {
        self.lines_used
    }

    /// Finds the first valid line holding the tag, in storage order
    pub fn find(&self, tag: u64) -> Option<usize> {
        let mut index = 0;
        while index < self.lines.len() {
            let line = &self.lines[index];
            if line.valid && line.tag == tag {
                return Some(index);
            }
            index += 1;
        }
        None
    }

    fn record_hit(&mut self, index: usize) {
        self.access_counts[index] += 1;
    }

    /// Fills or evicts the line at `index`, stamping it with the next tick of `clock`
    fn install(&mut self, tag: u64, index: usize, clock: &mut u64) {
        let line = &mut self.lines[index];
        line.tag = tag;
        line.valid = true;
        if self.lines_used < self.lines.len() {
            self.lines_used += 1;
        }
        *clock += 1;
        self.last_used_at[index] = *clock;
        self.access_counts[index] += 1;
    }
}

/// The bytes of line storage a cache of this shape needs, or `None` if it can't be allocated
///
/// # Arguments
///
/// * `num_sets`: `S`
/// * `lines_per_set`: `E`
///
/// returns: Option<usize>
pub fn storage_bytes(num_sets: u64, lines_per_set: u64) -> Option<usize> {
    let num_sets = usize::try_from(num_sets).ok()?;
    let lines_per_set = usize::try_from(lines_per_set).ok()?;
    // A line plus its timestamp and access count
    let per_line = mem::size_of::<Line>() + 2 * mem::size_of::<u64>();
    let per_set = lines_per_set.checked_mul(per_line)?.checked_add(mem::size_of::<Set>())?;
    let total = num_sets.checked_mul(per_set)?;
    (total <= isize::MAX as usize).then_some(total)
}

/// A generic trait for caches
///
/// Technically not required as we're using static dispatch instead of dyn Cache, but it keeps the
/// policy-specific caches and [`GenericCache`] interchangeable for callers
pub trait CacheTrait {
    /// Converts an address into a set index and a tag, see [`crate::address`]
    fn address_to_set_and_tag(&self, input: u64) -> (u64, u64);

    /// Classifies an access as a hit or a miss
    ///
    /// On both hits and misses, the implementation must update the counters, the line bookkeeping
    /// and, on a miss, install the address' tag. Never fails; addresses wider than the configured
    /// width are truncated by the decoder
    ///
    /// # Arguments
    ///
    /// * `input`: The address of the access
    ///
    /// returns: AccessOutcome
    fn access(&mut self, input: u64) -> AccessOutcome;

    fn get_hits(&self) -> u64;

    fn get_misses(&self) -> u64;

    /// Gets the number of lines which have never been filled. Useful for analysing cache
    /// performance or debugging
    fn get_uninitialised_line_count(&self) -> usize;
}

/// A set-associative cache, parameterised by a replacement policy
///
/// The logical clock used for recency lives here, so separate caches never share time
#[derive(Debug)]
pub struct Cache<R: ReplacementPolicy> {
    layout: AddressLayout,
    sets: Vec<Set>,
    clock: u64,
    hits: u64,
    misses: u64,
    replacement_policy: R,
}

impl<R: ReplacementPolicy> Cache<R> {
    /// Creates an empty cache with `2^s` sets of `lines_per_set` lines
    pub fn new(layout: AddressLayout, lines_per_set: usize, policy: R) -> Self {
        let num_sets = 1usize << layout.set_bits();
        Self {
            layout,
            sets: vec![Set::new(lines_per_set); num_sets],
            clock: 0,
            hits: 0,
            misses: 0,
            replacement_policy: policy,
        }
    }

    pub fn sets(&self) -> &[Set] {
        &self.sets
    }

    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn address_to_set_and_tag(&self, input: u64) -> (u64, u64) {
        self.layout.set_and_tag(input)
    }

    fn access(&mut self, input: u64) -> AccessOutcome {
        let (set, tag) = self.address_to_set_and_tag(input);
        let set = &mut self.sets[set as usize];
        if let Some(index) = set.find(tag) {
            // Hits count towards frequency, but not recency
            set.record_hit(index);
            self.hits += 1;
            return AccessOutcome::Hit;
        }
        self.misses += 1;
        let victim = self.replacement_policy.get_victim_line(set);
        if let Some(evicted) = set.lines()[victim].tag() {
            log::trace!("evicting tag {evicted:#x} from line {victim} for {input:#x}");
        }
        set.install(tag, victim, &mut self.clock);
        AccessOutcome::Miss
    }

    fn get_hits(&self) -> u64 {
        self.hits
    }

    fn get_misses(&self) -> u64 {
        self.misses
    }

    fn get_uninitialised_line_count(&self) -> usize {
        self.sets.iter()
            .map(|set| set.lines().iter().filter(|line| !line.is_valid()).count())
            .sum()
    }
}

/// Enum for both cache types provided by the library
///
/// Branching explicitly on the implementations lets the compiler see the concrete policy and inline
/// the victim search, which a trait object would hide from it
#[derive(Debug)]
pub enum GenericCache {
    LeastRecentlyUsed(Cache<LeastRecentlyUsed>),
    LeastFrequentlyUsed(Cache<LeastFrequentlyUsed>),
}

impl From<Cache<LeastRecentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Cache<LeastFrequentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastFrequentlyUsed>) -> Self {
        Self::LeastFrequentlyUsed(value)
    }
}

impl CacheTrait for GenericCache {
    fn address_to_set_and_tag(&self, input: u64) -> (u64, u64) {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.address_to_set_and_tag(input),
            GenericCache::LeastFrequentlyUsed(c) => c.address_to_set_and_tag(input),
        }
    }

    fn access(&mut self, input: u64) -> AccessOutcome {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.access(input),
            GenericCache::LeastFrequentlyUsed(c) => c.access(input),
        }
    }

    fn get_hits(&self) -> u64 {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.get_hits(),
            GenericCache::LeastFrequentlyUsed(c) => c.get_hits(),
        }
    }

    fn get_misses(&self) -> u64 {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.get_misses(),
            GenericCache::LeastFrequentlyUsed(c) => c.get_misses(),
        }
    }

    fn get_uninitialised_line_count(&self) -> usize {
        match self {
            GenericCache::LeastRecentlyUsed(c) => c.get_uninitialised_line_count(),
            GenericCache::LeastFrequentlyUsed(c) => c.get_uninitialised_line_count(),
        }
    }
}
