#[tokio::main]
async fn main() {
    pginval_cli::init_logging();
    if let Err(e) = pginval_cli::run(std::env::args().collect()).await {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
