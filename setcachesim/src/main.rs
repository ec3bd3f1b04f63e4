use std::fs::File;
use std::io::{stdin, stdout, sink, BufReader, BufWriter, Write};
use std::time::Instant;
use clap::Parser;
use setcache::config::CacheConfig;
use setcache::io::{get_input, read_all, split_config_record, write_summary};
use setcache::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative cache simulator with LRU and LFU replacement"))]
struct Args {
    /// Input holding the configuration record followed by the trace, stdin if omitted
    input: Option<String>,

    /// JSON cache configuration, the input then holds only the trace
    #[arg(short, long)]
    config: Option<String>,

    /// Print the summary as JSON instead of the per-access report
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let input = match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("Couldn't open the input file at path {path}: {e}"))?;
            get_input(file)?
        }
        None => read_all(stdin().lock())?,
    };
    let (config, trace) = match &args.config {
        Some(path) => {
            let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {path}: {e}"))?;
            let config: CacheConfig = serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?;
            (config, &input[..])
        }
        None => split_config_record(&input).map_err(|e| format!("Couldn't parse the configuration record: {e}"))?,
    };
    let mut simulator = Simulator::new(&config).map_err(|e| format!("Invalid cache configuration: {e}"))?;
    let mut out = BufWriter::new(stdout().lock());
    if args.json {
        let result = simulator.simulate(trace, &mut sink()).map_err(|e| format!("Simulation failed: {e}"))?;
        writeln!(out, "{}", serde_json::to_string_pretty(&result).map_err(|e| format!("Couldn't serialise the output {e}"))?)
            .map_err(|e| format!("Couldn't write the output: {e}"))?;
    } else {
        let result = simulator.simulate(trace, &mut out).map_err(|e| format!("Simulation failed: {e}"))?;
        write_summary(&mut out, &result).map_err(|e| format!("Couldn't write the output: {e}"))?;
    }
    out.flush().map_err(|e| format!("Couldn't write the output: {e}"))?;
    log::info!("finished simulation");
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        eprintln!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        eprintln!("Total execution time (includes reading input, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        eprintln!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        eprintln!("Parsed input configuration: {:?}", simulator.config());
        let layout = simulator.layout();
        eprintln!("Address layout: s = {}, b = {}, t = {}", layout.set_bits(), layout.offset_bits(), layout.tag_bits());
        eprintln!("Uninitialised cache lines: {}", simulator.get_uninitialised_line_count());
    }
    Ok(())
}
