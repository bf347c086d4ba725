use clap::Parser;
use tracing_subscriber::EnvFilter;
use xdrgen::cli::CommandLineInterface;

fn main() {
    let cli = CommandLineInterface::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match xdrgen::driver::run(&cli.request()) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
