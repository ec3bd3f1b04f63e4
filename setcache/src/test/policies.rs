use crate::address::AddressLayout;
use crate::cache::{AccessOutcome, Cache, CacheTrait};
use crate::cache::AccessOutcome::{Hit, Miss};
use crate::config::{CacheConfig, ReplacementPolicyConfig};
use crate::replacement_policies::{LeastFrequentlyUsed, LeastRecentlyUsed, ReplacementPolicy};
use crate::simulator::{SimulationResult, Simulator};

/// One set, byte sized blocks and 8 bit addresses, so every address is its own tag
fn single_set<R: ReplacementPolicy>(lines_per_set: usize, policy: R) -> Cache<R> {
    Cache::new(AddressLayout::new(0, 0, 8), lines_per_set, policy)
}

fn replay<C: CacheTrait>(cache: &mut C, addresses: &[u64]) -> Vec<AccessOutcome> {
    addresses.iter().map(|a| cache.access(*a)).collect()
}

fn resident_tags<R: ReplacementPolicy>(cache: &Cache<R>) -> Vec<Option<u64>> {
    cache.sets()[0].lines().iter().map(|line| line.tag()).collect()
}

#[test]
fn repeated_address_hits_after_first_fill() {
    let mut lru = single_set(1, LeastRecentlyUsed);
    assert_eq!(replay(&mut lru, &[7, 7, 7, 7]), [Miss, Hit, Hit, Hit]);
    let mut lfu = single_set(1, LeastFrequentlyUsed);
    assert_eq!(replay(&mut lfu, &[7, 7, 7, 7]), [Miss, Hit, Hit, Hit]);
}

#[test]
fn lru_capacity_miss() {
    let mut cache = single_set(2, LeastRecentlyUsed);
    assert_eq!(replay(&mut cache, &[0xA, 0xB, 0xC, 0xA]), [Miss, Miss, Miss, Miss]);
    assert_eq!(cache.get_hits() + cache.get_misses(), 4);
}

#[test]
fn lru_second_fill_replaces_line_zero() {
    // Only lines below lines_used are candidates, so with one fill behind it the set evicts line 0
    // again rather than using the empty line 1. Matches the C simulator
    let mut cache = single_set(2, LeastRecentlyUsed);
    assert_eq!(replay(&mut cache, &[0xA, 0xB]), [Miss, Miss]);
    assert_eq!(resident_tags(&cache), [Some(0xB), None]);
    assert_eq!(cache.get_uninitialised_line_count(), 1);
    assert_eq!(cache.sets()[0].lines_used(), 2);
    // Line 1 has a timestamp of 0, so it goes next
    assert_eq!(replay(&mut cache, &[0xA, 0xB]), [Miss, Hit]);
    assert_eq!(resident_tags(&cache), [Some(0xB), Some(0xA)]);
}

#[test]
fn lru_hits_do_not_refresh_recency() {
    let mut cache = single_set(2, LeastRecentlyUsed);
    assert_eq!(replay(&mut cache, &[0xA, 0xB, 0xC]), [Miss, Miss, Miss]);
    assert_eq!(cache.sets()[0].last_used_at(), [2, 3]);
    // B was just hit, but it was filled before C, so D evicts it
    assert_eq!(replay(&mut cache, &[0xB, 0xD, 0xB]), [Hit, Miss, Miss]);
    assert_eq!(resident_tags(&cache), [Some(0xD), Some(0xB)]);
    assert_eq!(cache.sets()[0].last_used_at(), [4, 5]);
}

#[test]
fn lru_victim_of_unfilled_set_is_line_zero() {
    let set = crate::cache::Set::new(4);
    // Nothing filled yet, the scan is empty and line 0 is the default
    assert_eq!(LeastRecentlyUsed.get_victim_line(&set), 0);
}

#[test]
fn lfu_evicts_least_frequent() {
    let mut cache = single_set(2, LeastFrequentlyUsed);
    assert_eq!(replay(&mut cache, &[0xA, 0xA, 0xB, 0xC]), [Miss, Hit, Miss, Miss]);
    assert_eq!(resident_tags(&cache), [Some(0xA), Some(0xC)]);
    assert_eq!(replay(&mut cache, &[0xA, 0xB]), [Hit, Miss]);
}

#[test]
fn lfu_fills_empty_lines_first() {
    let mut cache = single_set(4, LeastFrequentlyUsed);
    assert_eq!(replay(&mut cache, &[1, 2, 3, 4]), [Miss, Miss, Miss, Miss]);
    assert_eq!(resident_tags(&cache), [Some(1), Some(2), Some(3), Some(4)]);
    assert_eq!(cache.get_uninitialised_line_count(), 0);
    // All counts are 1, the tie goes to line 0
    assert_eq!(replay(&mut cache, &[5]), [Miss]);
    assert_eq!(resident_tags(&cache), [Some(5), Some(2), Some(3), Some(4)]);
}

#[test]
fn lfu_counts_accumulate_across_evictions() {
    let mut cache = single_set(2, LeastFrequentlyUsed);
    replay(&mut cache, &[0xA, 0xA, 0xB, 0xC]);
    // Line 1 held B once and C once, the fill doesn't reset its count
    assert_eq!(cache.sets()[0].access_counts(), [2, 2]);
    assert_eq!(cache.sets()[0].last_used_at(), [1, 3]);
}

#[test]
fn sets_are_independent() {
    // s = 1, b = 2: bit 2 selects the set
    let mut cache = Cache::new(AddressLayout::new(1, 2, 5), 1, LeastRecentlyUsed);
    assert_eq!(replay(&mut cache, &[0x00, 0x04, 0x00, 0x04, 0x08]), [Miss, Miss, Hit, Hit, Miss]);
    assert_eq!(cache.sets()[0].lines()[0].tag(), Some(1));
    assert_eq!(cache.sets()[1].lines()[0].tag(), Some(0));
}

#[test]
fn valid_lines_never_exceed_associativity() {
    let mut cache = Cache::new(AddressLayout::new(2, 0, 6), 3, LeastRecentlyUsed);
    let addresses: Vec<u64> = (0..200u64).map(|i| (i * 37) % 256).collect();
    let outcomes = replay(&mut cache, &addresses);
    assert_eq!(outcomes.len() as u64, cache.get_hits() + cache.get_misses());
    for set in cache.sets() {
        assert!(set.lines().iter().filter(|line| line.is_valid()).count() <= 3);
        assert!(set.lines_used() <= 3);
    }
}

#[test]
fn simulator_statistics() {
    let config = CacheConfig {
        sets: 4,
        lines_per_set: 1,
        block_size: 16,
        address_bits: 16,
        policy: ReplacementPolicyConfig::LeastRecentlyUsed,
        hit_time: 1,
        miss_penalty: 100,
    };
    let mut simulator = Simulator::new(&config).unwrap();
    assert_eq!(simulator.result().miss_rate, None);
    assert_eq!(simulator.result().to_string(), "0.000000 0");
    for address in [0x0, 0x10, 0x0] {
        simulator.access(address);
    }
    let result = simulator.result();
    assert_eq!(result.accesses(), 3);
    assert_eq!(result.total_cycles, 203);
    assert_eq!(result.to_string(), "0.666667 203");
    assert_eq!(simulator.get_uninitialised_line_count(), 2);
    assert_eq!(
        SimulationResult::from_counts(0, 4, &config).to_string(),
        "1.000000 404"
    );
}

#[test]
fn json_summary() {
    let config = CacheConfig {
        sets: 1,
        lines_per_set: 1,
        block_size: 1,
        address_bits: 8,
        policy: ReplacementPolicyConfig::LeastFrequentlyUsed,
        hit_time: 1,
        miss_penalty: 100,
    };
    let mut simulator = Simulator::new(&config).unwrap();
    // Nothing accessed, the miss rate is null rather than NaN
    assert_eq!(
        serde_json::to_string(&simulator.result()).unwrap(),
        r#"{"hits":0,"misses":0,"miss_rate":null,"total_cycles":0}"#
    );
    for address in [0x1, 0x2, 0x3, 0x4] {
        simulator.access(address);
    }
    assert_eq!(
        serde_json::to_string(&simulator.result()).unwrap(),
        r#"{"hits":0,"misses":4,"miss_rate":1.0,"total_cycles":404}"#
    );
    simulator.access(0x4);
    simulator.access(0x4);
    let value = serde_json::to_value(simulator.result()).unwrap();
    assert_eq!(value["hits"], 2);
    assert_eq!(value["misses"], 4);
    assert_eq!(value["total_cycles"], 406);
    assert_eq!(value["miss_rate"].as_f64(), Some(f64::from(4f32 / 6f32)));
}
