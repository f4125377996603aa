use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;
use setcache::cache::CacheTrait;
use setcache::config::{CacheConfig, CacheConfiguration, ReplacementPolicyConfig, WriteHitPolicy, WriteMissPolicy};
use setcache::io::{open_trace, read_stdin};
use setcache::simulator::{MalformedRecordPolicy, Simulator};

#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative cache simulator, replays a trace of loads and stores"))]
struct Args {
    /// Number of sets in the cache (a positive power of 2)
    #[arg(required_unless_present = "config")]
    num_sets: Option<u64>,

    /// Number of blocks in each set (a positive power of 2)
    #[arg(required_unless_present = "config")]
    associativity: Option<u64>,

    /// Number of bytes in each block (a positive power of 2, at least 4)
    #[arg(required_unless_present = "config")]
    block_size: Option<u64>,

    #[arg(value_enum, required_unless_present = "config")]
    write_miss: Option<WriteMissArg>,

    #[arg(value_enum, required_unless_present = "config")]
    write_hit: Option<WriteHitArg>,

    #[arg(value_enum, required_unless_present = "config")]
    eviction: Option<EvictionArg>,

    /// JSON cache configuration, in place of the positional arguments
    #[arg(long, conflicts_with_all = ["num_sets", "associativity", "block_size", "write_miss", "write_hit", "eviction"])]
    config: Option<PathBuf>,

    /// Trace file to replay, read from stdin if not given
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Print the statistics as JSON
    #[arg(long)]
    json: bool,

    /// Fail on a malformed trace record instead of stopping there
    #[arg(long)]
    strict: bool,

    #[arg(short, long)]
    performance: bool,

    /// Print the parsed configuration and final cache occupancy to stderr
    #[arg(short, long)]
    debug: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum WriteMissArg {
    WriteAllocate,
    NoWriteAllocate,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum WriteHitArg {
    WriteThrough,
    WriteBack,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EvictionArg {
    Lru,
    Fifo,
}

impl From<WriteMissArg> for WriteMissPolicy {
    fn from(value: WriteMissArg) -> Self {
        match value {
            WriteMissArg::WriteAllocate => WriteMissPolicy::WriteAllocate,
            WriteMissArg::NoWriteAllocate => WriteMissPolicy::WriteAround,
        }
    }
}

impl From<WriteHitArg> for WriteHitPolicy {
    fn from(value: WriteHitArg) -> Self {
        match value {
            WriteHitArg::WriteThrough => WriteHitPolicy::WriteThrough,
            WriteHitArg::WriteBack => WriteHitPolicy::WriteBack,
        }
    }
}

impl From<EvictionArg> for ReplacementPolicyConfig {
    fn from(value: EvictionArg) -> Self {
        match value {
            EvictionArg::Lru => ReplacementPolicyConfig::LeastRecentlyUsed,
            EvictionArg::Fifo => ReplacementPolicyConfig::FirstInFirstOut,
        }
    }
}

impl Args {
    fn cache_config(&self) -> Result<CacheConfig, String> {
        if let Some(path) = &self.config {
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {}: {e}", path.display()))?;
            return serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"));
        }
        // clap guarantees these are all present without --config
        let missing = || "missing cache parameters".to_string();
        Ok(CacheConfig {
            num_sets: self.num_sets.ok_or_else(missing)?,
            associativity: self.associativity.ok_or_else(missing)?,
            block_size: self.block_size.ok_or_else(missing)?,
            write_miss: self.write_miss.ok_or_else(missing)?.into(),
            write_hit: self.write_hit.ok_or_else(missing)?.into(),
            eviction: self.eviction.ok_or_else(missing)?.into(),
        })
    }
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = match Args::try_parse() {
        Ok(args) => args,
        // Bad arguments exit with 1, like any other configuration failure
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = CacheConfiguration::try_from(args.cache_config()?).map_err(|e| format!("Invalid cache configuration: {e}"))?;
    info!(%config, "cache configured");
    let trace = match &args.trace {
        Some(path) => open_trace(path)?,
        None => read_stdin()?,
    };
    let on_malformed = if args.strict { MalformedRecordPolicy::Fail } else { MalformedRecordPolicy::Stop };

    let mut simulator = Simulator::new(&config);
    let result = simulator.simulate(&trace, on_malformed).map_err(|e| format!("Couldn't read the trace: {e}"))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        println!("{result}");
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        eprintln!("Records replayed: {}", simulator.get_record_count());
        eprintln!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        eprintln!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        eprintln!("Running the debug binary. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        let cache = simulator.cache();
        let config = cache.configuration();
        eprintln!("Parsed input configuration: {config}");
        let as_json = serde_json::to_string(&CacheConfig::from(config)).map_err(|e| format!("Couldn't serialise the configuration {e}"))?;
        eprintln!("As a config file: {as_json}");
        let total_blocks = config.num_sets() * config.associativity();
        eprintln!("Valid cache blocks: {} of {total_blocks}", cache.valid_block_count());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments_build_a_config() {
        let args = Args::try_parse_from(["cachesim", "256", "4", "16", "write-allocate", "write-back", "fifo"]).unwrap();
        let config = args.cache_config().unwrap();
        assert_eq!(config.num_sets, 256);
        assert_eq!(config.write_miss, WriteMissPolicy::WriteAllocate);
        assert_eq!(config.write_hit, WriteHitPolicy::WriteBack);
        assert_eq!(config.eviction, ReplacementPolicyConfig::FirstInFirstOut);
    }

    #[test]
    fn write_around_with_write_back_is_rejected() {
        let args = Args::try_parse_from(["cachesim", "256", "4", "16", "no-write-allocate", "write-back", "lru"]).unwrap();
        assert!(CacheConfiguration::try_from(args.cache_config().unwrap()).is_err());
    }

    #[test]
    fn unknown_policy_is_an_argument_error() {
        assert!(Args::try_parse_from(["cachesim", "256", "4", "16", "write-allocate", "write-back", "random"]).is_err());
        assert!(Args::try_parse_from(["cachesim", "256", "4"]).is_err());
    }

    #[test]
    fn debug_output_is_opt_in() {
        let args = Args::try_parse_from(["cachesim", "--config", "cache.json"]).unwrap();
        assert!(!args.debug);
        let args = Args::try_parse_from(["cachesim", "--config", "cache.json", "-d"]).unwrap();
        assert!(args.debug);
    }

    #[test]
    fn config_file_replaces_positionals() {
        let args = Args::try_parse_from(["cachesim", "--config", "cache.json", "--trace", "gcc.trace"]).unwrap();
        assert!(args.num_sets.is_none());
        assert_eq!(args.config, Some(PathBuf::from("cache.json")));
    }
}
