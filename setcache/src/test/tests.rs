use std::error::Error;
use std::fs;
use crate::simulator::parse_address;
use crate::util::{get_configs, render_report};

#[test]
fn run_all_examples() -> Result<(), Box<dyn Error>> {
    let cases = get_configs()?;
    assert!(!cases.is_empty(), "no fixtures found");
    for test in cases {
        println!("Running test for {}", test.name);
        let input = fs::read(&test.input)?;
        let expected_output = fs::read_to_string(&test.output)?;
        let output = render_report(&input)?;
        assert_eq!(output, expected_output, "fixture {}", test.name);
    }
    Ok(())
}

#[test]
fn invalid_address_stops_the_trace() {
    let err = render_report(b"1 1 1 8 lru 1 1\n1 2 zz 3 -1").unwrap_err();
    assert_eq!(err.to_string(), "`zz` (trace entry 2) is not a 64-bit hexadecimal address");
}

#[test]
fn invalid_configuration_is_reported() {
    let err = render_report(b"3 1 1 8 lru 1 1\n-1").unwrap_err();
    assert_eq!(err.to_string(), "the number of sets must be a power of two, got 3");
}

#[test]
fn address_parsing_limits() {
    assert_eq!(parse_address(b"ffffffffffffffff"), Some(u64::MAX));
    assert_eq!(parse_address(b"0xFFFFFFFFFFFFFFFF"), Some(u64::MAX));
    // 17 significant digits don't fit
    assert_eq!(parse_address(b"10000000000000000"), None);
    assert_eq!(parse_address(b"0x1ffffffffffffffff"), None);
    // Leading zeros don't count towards the width
    assert_eq!(parse_address(b"000000000000000001"), Some(1));
    assert_eq!(parse_address(b"0x00000000000000000000ab"), Some(0xab));
    assert_eq!(parse_address(b"0x"), None);
    assert_eq!(parse_address(b""), None);
    assert_eq!(parse_address(b"-2"), None);
}
