use clap::Parser;
use wind_rose_processor::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        // "no data" is an answer, not a crash
        std::process::exit(if e.is_no_data() { 2 } else { 1 });
    }
}
