//! Complete a parameter file against a relation table.
//!
//! Usage: `cosmosis-consistency <PARAMS> [--model FILE] [--format yaml|json] [--provenance]`

use std::process;

use clap::Parser;
use tracing::error;

use cosmosis_consistency_run::{Cli, init_logging, run};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(output) => print!("{output}"),
        Err(err) => {
            error!("{}", err);
            process::exit(1);
        }
    }
}
