//! Lightweight rule parsing benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p coll_rules_core --example parse_benchmark --release`
//!
//! Set `COLL_RULES_FILE` to time a rule file of your own as well.

use std::fs;
use std::time::Instant;

use coll_rules_core::{CollationSettings, DirectiveLog, RuleParser};

/// A long chain of primary relations over consecutive letters.
fn synthetic_chain(len: usize) -> String {
    let mut rules = String::from("&a");
    for c in ('\u{100}'..).take(len) {
        rules.push_str(" < ");
        rules.push(c);
    }
    rules
}

/// Settings, special resets, quoting and starred ranges mixed together.
fn synthetic_mixed(repeat: usize) -> String {
    let block = "[caseFirst upper][strength 2]\n\
                 &[before 2]a << \u{E4} <<< \u{C4}\n\
                 &[first tertiary ignorable] = '-'\n\
                 &k < ch|x / h # contraction with context\n\
                 &z <* \u{3B1}-\u{3C9}\n";
    block.repeat(repeat)
}

fn run_benchmark(label: &str, input: &str, iterations: usize) -> Result<(), String> {
    let start = Instant::now();
    let mut directives = 0;
    for _ in 0..iterations {
        let mut log = DirectiveLog::new();
        let mut settings = CollationSettings::default();
        RuleParser::new()
            .parse(input, &mut log, &mut settings)
            .map_err(|e| format!("{label}: {e}"))?;
        directives = log.len();
    }
    let elapsed = start.elapsed();

    println!("Benchmark: {label}");
    println!("  input_bytes: {}", input.len());
    println!("  directives:  {directives}");
    println!(
        "  parse: total={:?}, per_iter={:.3} ms",
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / iterations as f64
    );
    Ok(())
}

fn main() -> Result<(), String> {
    let iterations = std::env::var("COLL_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(500);

    run_benchmark("chain", &synthetic_chain(2_000), iterations)?;
    run_benchmark("mixed", &synthetic_mixed(200), iterations)?;

    if let Ok(path) = std::env::var("COLL_RULES_FILE") {
        let input =
            fs::read_to_string(&path).map_err(|e| format!("failed to read '{path}': {e}"))?;
        run_benchmark(&path, &input, iterations)?;
    }

    Ok(())
}
