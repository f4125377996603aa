use crate::cache::CacheTrait;
use crate::config::{CacheConfig, CacheConfiguration, ReplacementPolicyConfig, WriteHitPolicy, WriteMissPolicy};
use crate::error::TraceError;
use crate::simulator::{MalformedRecordPolicy, Simulator};
use crate::trace::{Operation, TraceReader, TraceRecord};

fn records(trace: &str) -> Vec<Result<TraceRecord, TraceError>> {
    TraceReader::new(trace.as_bytes()).collect()
}

fn direct_config() -> CacheConfiguration {
    CacheConfiguration::try_from(CacheConfig {
        num_sets: 4,
        associativity: 1,
        block_size: 16,
        write_miss: WriteMissPolicy::WriteAllocate,
        write_hit: WriteHitPolicy::WriteBack,
        eviction: ReplacementPolicyConfig::LeastRecentlyUsed,
    }).unwrap()
}

#[test]
fn reads_records_and_skips_blank_lines() {
    let parsed = records("l 0x1fffff50 1\n\n   \ns 0x1fffff58 4\r\nS 1f 8");
    assert_eq!(parsed, vec![
        Ok(TraceRecord { operation: Operation::Load, address: 0x1fffff50, size: 1 }),
        Ok(TraceRecord { operation: Operation::Store, address: 0x1fffff58, size: 4 }),
        Ok(TraceRecord { operation: Operation::Store, address: 0x1f, size: 8 }),
    ]);
}

#[test]
fn anything_but_l_is_a_store() {
    assert_eq!(Operation::from_code(b'l'), Operation::Load);
    for code in [b's', b'L', b'w', b'x'] {
        assert_eq!(Operation::from_code(code), Operation::Store);
    }
}

#[test]
fn malformed_records_report_their_line() {
    let parsed = records("l 0x10 4\nload 0x10 4\nl 0xzz 4\nl 0x100000000 4\nl 0x10 four\nl 0x10\nl 0x10 4 extra\n");
    assert!(parsed[0].is_ok());
    assert_eq!(parsed[1], Err(TraceError::InvalidOperation { line: 2, found: "load".to_string() }));
    assert_eq!(parsed[2], Err(TraceError::InvalidAddress { line: 3, found: "0xzz".to_string() }));
    assert_eq!(parsed[3], Err(TraceError::AddressOutOfRange { line: 4, found: "0x100000000".to_string() }));
    assert_eq!(parsed[4], Err(TraceError::InvalidSize { line: 5, found: "four".to_string() }));
    assert_eq!(parsed[5], Err(TraceError::MissingField { line: 6 }));
    assert_eq!(parsed[6].as_ref().unwrap_err().line(), 7);
}

#[test]
fn full_width_address_is_accepted() {
    assert_eq!(records("s 0xFFFFFFFF 4")[0].as_ref().unwrap().address, u32::MAX);
}

#[test]
fn stop_policy_keeps_records_before_the_bad_one() {
    let mut simulator = Simulator::new(&direct_config());
    let stats = simulator.simulate(b"l 0x00 4\nl 0x00 4\nbad\nl 0x40 4\n", MalformedRecordPolicy::Stop).unwrap();
    assert_eq!(stats.total_loads(), 2);
    assert_eq!(stats.total_cycles(), 402);
    assert_eq!(simulator.get_record_count(), 2);
}

#[test]
fn fail_policy_returns_the_error() {
    let mut simulator = Simulator::new(&direct_config());
    let result = simulator.simulate(b"l 0x00 4\nl 0x00\n", MalformedRecordPolicy::Fail);
    assert_eq!(result, Err(TraceError::MissingField { line: 2 }));
    // The good record was still replayed
    assert_eq!(simulator.statistics().total_loads(), 1);
}

#[test]
fn simulate_carries_on_from_previous_state() {
    let mut simulator = Simulator::new(&direct_config());
    simulator.simulate(b"s 0x00 4\n", MalformedRecordPolicy::Fail).unwrap();
    let stats = simulator.simulate(b"l 0x00 4\n", MalformedRecordPolicy::Fail).unwrap().clone();
    assert_eq!(stats.store_misses(), 1);
    assert_eq!(stats.load_hits(), 1);
    assert_eq!(simulator.cache().valid_block_count(), 1);
}

#[test]
fn parsed_records_replay_like_text() {
    let trace = "l 0x00 4\ns 0x40 4\nl 0x00 4\n";
    let parsed: Vec<TraceRecord> = TraceReader::new(trace.as_bytes()).map(Result::unwrap).collect();
    let mut from_records = Simulator::new(&direct_config());
    let mut from_text = Simulator::new(&direct_config());
    let expected = from_text.simulate(trace.as_bytes(), MalformedRecordPolicy::Fail).unwrap();
    assert_eq!(from_records.simulate_records(&parsed), expected);
}

#[test]
fn statistics_render_as_text() {
    let mut simulator = Simulator::new(&direct_config());
    let stats = simulator.simulate(b"l 0x00 4\nl 0x00 4\n", MalformedRecordPolicy::Fail).unwrap();
    assert_eq!(
        stats.to_string(),
        "Total loads: 2\nTotal stores: 0\nLoad hits: 1\nLoad misses: 1\nStore hits: 0\nStore misses: 0\nTotal cycles: 402"
    );
}
