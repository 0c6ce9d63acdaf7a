//! Skin CLI - extract the boundary of a hex mesh.
//!
//! Usage: skin [-b BLOCK]... [-a] [-m] [-M EPSILON] [-p] [-s SIDESET] [-S]
//!             [-t | -T NAME] [-w] [-l] <INPUT> [OUTPUT]
//!
//! Run `skin --help` for details. Set `RUST_LOG` for diagnostics.

mod args;
mod error;
mod run;


use clap::Parser;
use config::constants::{EXIT_SUCCESS, EXIT_USAGE};

use crate::args::Args;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = if err.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    match run::run(&args) {
        Ok(report) => {
            if args.list {
                println!("{}", report.summary());
            }
            if args.timings {
                for (phase, elapsed) in &report.timings {
                    println!("{:<6} {:>10.3} ms", phase, elapsed.as_secs_f64() * 1000.0);
                }
            }
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}
