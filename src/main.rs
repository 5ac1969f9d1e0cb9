#[tokio::main]
async fn main() {
    if let Err(e) = klinik_sentosa::run().await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
