#[tokio::main]
async fn main() {
    aipriceforecast::server::init_tracing();
    aipriceforecast::cli::run().await;
}
