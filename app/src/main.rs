#[tokio::main]
async fn main() -> anyhow::Result<()> {
    metrics_hub::app::run().await
}
