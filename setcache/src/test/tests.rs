use std::error::Error;
use std::path::Path;
use crate::io::open_trace;
use crate::simulator::{MalformedRecordPolicy, Simulator};
use crate::util::{get_configs, read_config, read_statistics, FIXTURES_PATH};

#[test]
fn run_all_examples() -> Result<(), Box<dyn Error>> {
    let cases = get_configs(Path::new(FIXTURES_PATH))?;
    assert!(!cases.is_empty(), "no fixtures found under {FIXTURES_PATH}");
    for test in cases {
        println!("Running test for {}", test.output.display());
        let expected_output = read_statistics(&test.output)?;
        let config = read_config(&test.config)?;
        let trace = open_trace(&test.trace)?;
        // Simulate!
        let mut simulator = Simulator::new(&config);
        let result = simulator.simulate(&trace, MalformedRecordPolicy::Fail)?;
        assert_eq!(*result, expected_output, "mismatch for {}", test.output.display());
        let time = simulator.get_execution_time();
        println!("Success for {}, time: {}", test.output.display(), time.as_nanos() as f64 / 1e9);
    }
    Ok(())
}
