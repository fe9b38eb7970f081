use clap::Parser;
use macross::cli::{Cli, run};
use macross::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    run(cli)
}
