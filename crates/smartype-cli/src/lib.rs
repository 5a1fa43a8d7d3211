pub mod cli;
pub mod commands;
pub mod utils;

use clap::Parser;
use cli::Smartype;
use commands::handle_command;
use std::process;

/// Run the smartype CLI application
pub fn run_main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Smartype::parse();
    let result = handle_command(args.commands);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
