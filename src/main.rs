use clap::Parser;
use fgtrader::cli::{Cli, init_logging, run};

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
