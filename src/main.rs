use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = hostrelay::cli::Cli::parse();
    if let Err(e) = hostrelay::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
