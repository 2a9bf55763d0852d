use clap::Parser;
use quote_aggregator::Arguments;

#[tokio::main]
async fn main() {
    let args = Arguments::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_filter))
        .init();

    if let Err(error) = quote_aggregator::run::run(args).await {
        tracing::error!(?error, "quote aggregator exited with an error");
        std::process::exit(1);
    }
}
