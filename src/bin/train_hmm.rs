const PROGRAM: &str = "train_hmm";

use baum::prelude::*;
use log::info;
use std::{env, fs, str::FromStr};

const DEFAULT_STATES: usize = 5;
const DEFAULT_SYMBOLS: usize = 26;
const DEFAULT_LENGTH: usize = 1_000;

fn die(message: &str) -> ! {
    eprintln!("\n{PROGRAM} ERROR! {message}\n");
    std::process::exit(1);
}

fn usage() -> ! {
    eprintln!("\nUsage:\n\t{PROGRAM} <text-file> [states] [symbols] [length] [restarts] [seed]\n");
    eprintln!("\tstates\t\thidden states (default {DEFAULT_STATES})");
    eprintln!("\tsymbols\t\t26 for letters, 27 for letters and space (default {DEFAULT_SYMBOLS})");
    eprintln!("\tlength\t\tobservations read from the text (default {DEFAULT_LENGTH})");
    eprintln!(
        "\trestarts\trandom restarts (default {})",
        TrainingConfig::DEFAULT_RESTARTS
    );
    eprintln!("\tseed\t\tmaster seed (default: from the clock)\n");
    std::process::exit(1);
}

/// Parses the positional argument at `index`, falling back to `default`.
fn arg_or<T: FromStr>(args: &[String], index: usize, name: &str, default: T) -> T {
    match args.get(index) {
        Some(value) => value
            .parse()
            .unwrap_or_else(|_| die(&format!("Could not parse {name} from '{value}'"))),
        None => default,
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 7 || args[1] == "-h" || args[1] == "--help" {
        usage();
    }

    let states = arg_or(&args, 2, "states", DEFAULT_STATES);
    let symbols = arg_or(&args, 3, "symbols", DEFAULT_SYMBOLS);
    let length = arg_or(&args, 4, "length", DEFAULT_LENGTH);
    let restarts = arg_or(&args, 5, "restarts", TrainingConfig::DEFAULT_RESTARTS);
    let seed: Option<u64> = args.get(6).map(|s| {
        s.parse()
            .unwrap_or_else(|_| die(&format!("Could not parse seed from '{s}'")))
    });

    let Some(alphabet) = Alphabet::from_n_symbols(symbols) else {
        die(&format!("{symbols} symbols is not a supported alphabet, use 26 or 27"))
    };

    let text = fs::read(&args[1]).unwrap_or_die(&format!("Couldn't read {}", args[1]));
    let observations = alphabet.encode_prefix(&text, length).unwrap_or_fail();
    info!("read {} observations from {}", observations.len(), args[1]);

    let mut config = TrainingConfig::new(states, symbols).with_restarts(restarts);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    println!("Running with {restarts} random restarts");
    println!("N: {states}; M: {symbols}; T: {}", observations.len());

    let best = RandomRestartOptimizer::new(config)
        .run(&observations)
        .unwrap_or_fail();

    println!(
        "Best model found (restart {}, {} iterations):",
        best.restart, best.iterations
    );
    print!("{}", best.model);
    println!("log P(O | model) = {}", best.log_prob);
}
