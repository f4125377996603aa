use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use regex::Regex;
use crate::config::{CacheConfig, CacheConfiguration};
use crate::stats::Statistics;

pub const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

lazy_static! {
    static ref OUTPUT_PATTERN: Regex = Regex::new(r"^output-(?P<trace>[0-9a-zA-Z_]+)-(?P<config>[0-9a-zA-Z_]+)\.json$").unwrap();
}

/// An expected output, and the trace and config which should produce it
pub struct TestCasePaths {
    pub config: PathBuf,
    pub trace: PathBuf,
    pub output: PathBuf,
}

/// Finds every expected output under `<fixtures>/outputs`, sorted by name. Each output file is
/// named `output-<trace>-<config>.json`, for `traces/<trace>.trace` and `configs/<config>.json`
pub fn get_configs(fixtures: &Path) -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(fixtures.join("outputs"))? {
        let file_name = entry?
            .file_name()
            .into_string()
            .map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if OUTPUT_PATTERN.is_match(&file_name) {
            files.push(file_name);
        }
    }
    files.sort();
    let mut out = Vec::new();
    for file_name in files {
        let tokens = OUTPUT_PATTERN.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace = tokens.name("trace").ok_or("Couldn't get the trace file from the output file name".to_string())?.as_str();
        let config = tokens.name("config").ok_or("Couldn't get the config file from the output file name".to_string())?.as_str();
        out.push(TestCasePaths {
            config: fixtures.join("configs").join(format!("{config}.json")),
            trace: fixtures.join("traces").join(format!("{trace}.trace")),
            output: fixtures.join("outputs").join(&file_name),
        })
    }
    Ok(out)
}

/// Reads and validates a JSON cache configuration
pub fn read_config(path: &Path) -> Result<CacheConfiguration, Box<dyn Error>> {
    let config: CacheConfig = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    Ok(CacheConfiguration::try_from(config)?)
}

/// Reads a JSON statistics snapshot
pub fn read_statistics(path: &Path) -> Result<Statistics, Box<dyn Error>> {
    Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
}
