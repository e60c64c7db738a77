use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = roadwatch::cli::run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
