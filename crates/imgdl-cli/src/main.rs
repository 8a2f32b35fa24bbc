mod cli;

use crate::cli::Cli;

fn main() {
    // Parse CLI, load config, initialize logging, dispatch.
    if let Err(err) = Cli::run_from_args() {
        eprintln!("imgdl error: {:#}", err);
        std::process::exit(1);
    }
}
