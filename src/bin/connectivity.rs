//! Reads `n q` and then `q` requests from stdin: `+ u v` adds an edge, `- u v`
//! removes one, anything else prints the current number of components.
//!
//! `L0_DELTA` and `L0_SEED` override the sketch failure probability and seed.

use std::error::Error;
use std::io::{self, BufRead, BufWriter, Write};
use std::str::FromStr;

use dynamic_connectivity::{DynamicConnectivity, SketchConfig, SketchConnectivity};
use flexi_logger::Logger;

fn parse<T: FromStr>(token: Option<&str>, line: usize, what: &str) -> Result<T, String> {
    token
        .ok_or_else(|| format!("line {line}: missing {what}"))?
        .parse()
        .map_err(|_| format!("line {line}: invalid {what}"))
}

fn config_from_env() -> Result<SketchConfig, Box<dyn Error>> {
    let mut config = SketchConfig::default();
    if let Ok(delta) = std::env::var("L0_DELTA") {
        config = config.with_delta(delta.parse()?);
    }
    if let Ok(seed) = std::env::var("L0_SEED") {
        config = config.with_seed(seed.parse()?);
    }
    Ok(config)
}

/// Answers the requests in `input`, one component count per query line.
fn run(
    input: impl BufRead,
    mut out: impl Write,
    config: SketchConfig,
) -> Result<(), Box<dyn Error>> {
    let mut lines = input.lines().enumerate().map(|(i, l)| (i + 1, l));
    let (first, header) = lines.next().ok_or("empty input")?;
    let header = header?;
    let mut tokens = header.split_whitespace();
    let n: usize = parse(tokens.next(), first, "vertex count")?;
    let q: usize = parse(tokens.next(), first, "request count")?;
    log::info!("{n} vertices, {q} requests, {config:?}");

    let mut graph = SketchConnectivity::with_config(n, config)?;
    for (line, request) in lines.take(q) {
        let request = request?;
        let mut tokens = request.split_whitespace();
        match tokens.next() {
            Some(op @ ("+" | "-")) => {
                let u = parse(tokens.next(), line, "vertex")?;
                let v = parse(tokens.next(), line, "vertex")?;
                let updated = if op == "+" {
                    graph.add_edge(u, v)
                } else {
                    graph.remove_edge(u, v)
                };
                updated.map_err(|e| format!("line {line}: {e}"))?;
            }
            _ => writeln!(out, "{}", graph.component_count())?,
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let _logger = Logger::try_with_env_or_str("warn")?
        .format(flexi_logger::colored_default_format)
        .start()?;
    let config = config_from_env()?;
    run(
        io::stdin().lock(),
        BufWriter::new(io::stdout().lock()),
        config,
    )
}
