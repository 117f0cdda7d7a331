use clap::Parser;
use kdam::{term, term::Colorizer};
use psvd::Args;
use std::process;

fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let colored = args.colored();

    term::init(colored);
    colored::control::set_override(colored);
    args.execute()
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".colorize("bold red"), e);
        process::exit(1);
    }
}
