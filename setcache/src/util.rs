use std::error::Error;
use std::fs;
use regex::Regex;
use crate::io::{split_config_record, write_summary};
use crate::simulator::Simulator;

pub const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

pub struct TestCasePaths {
    pub name: String,
    pub input: String,
    pub output: String,
}

/// Finds every `output-<name>.txt` fixture with its `input-<name>.txt`, sorted by name
pub fn get_configs() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let mut out = Vec::new();
    let output_pattern = Regex::new(r"^output-(?P<name>[0-9a-zA-Z_]+)\.txt$")?;
    let mut file_names = fs::read_dir(FIXTURES_PATH)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    file_names.retain(|name| output_pattern.is_match(name));
    file_names.sort();
    for file_name in file_names {
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let name = tokens.name("name").ok_or("Couldn't get the case name from the output file name".to_string())?.as_str();
        out.push(TestCasePaths {
            name: name.to_string(),
            input: format!("{FIXTURES_PATH}/input-{name}.txt"),
            output: format!("{FIXTURES_PATH}/{file_name}"),
        })
    }
    Ok(out)
}

/// Runs a whole text input, configuration record and trace, returning the report as it would be
/// printed
pub fn render_report(input: &[u8]) -> Result<String, Box<dyn Error>> {
    let (config, trace) = split_config_record(input)?;
    let mut simulator = Simulator::new(&config)?;
    let mut report = Vec::new();
    let result = simulator.simulate(trace, &mut report)?;
    write_summary(&mut report, &result)?;
    Ok(String::from_utf8(report)?)
}
