use crate::cache::Set;

/// A generic trait for implementing new replacement policies. Can be used to parameterise a Cache.
///
/// The per-line bookkeeping (fill timestamps and access counts) is kept by the [`Set`] itself, so
/// a policy only has to decide which line gets replaced
pub trait ReplacementPolicy {
    /// Used by the cache to get a line index when a new line needs added to a full or partially
    /// filled set.
    ///
    /// Implementations must return an index below the set's associativity. The cache performs the
    /// install, implementations should not assume anything about the line afterwards
    ///
    /// # Arguments
    ///
    /// * `set`: The set the missed address maps to
    ///
    /// returns: usize
    fn get_victim_line(&self, set: &Set) -> usize;
}

/// Least recently used replacement policy
///
/// Recency is the logical time the line was last *filled*; hits don't refresh it. Only the first
/// `lines_used` lines are candidates, so while a set has been filled fewer than two times line 0 is
/// always the victim, even if line 1 has never held anything.
#[derive(Debug, Default, Copy, Clone)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn get_victim_line(&self, set: &Set) -> usize {
        let last_used_at = set.last_used_at();
        let mut index = 0;
        let mut min_value = u64::MAX;
        let mut min_index = 0;
        // Strict comparison, the lowest index wins ties
        while index < set.lines_used() {
            if last_used_at[index] < min_value {
                min_value = last_used_at[index];
                min_index = index;
            }
            index += 1;
        }
        min_index
    }
}

/// Least frequently used replacement policy
///
/// Every line is a candidate. Lines which have never been filled have a count of 0 so they go
/// first, lowest index first
#[derive(Debug, Default, Copy, Clone)]
pub struct LeastFrequentlyUsed;

impl ReplacementPolicy for LeastFrequentlyUsed {
    fn get_victim_line(&self, set: &Set) -> usize {
        let access_counts = set.access_counts();
        let mut index = 0;
        let mut min_value = u64::MAX;
        let mut min_index = 0;
        while index < access_counts.len() {
            if access_counts[index] < min_value {
                min_value = access_counts[index];
                min_index = index;
            }
            index += 1;
        }
        min_index
    }
}
