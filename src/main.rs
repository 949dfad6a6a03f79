#[tokio::main]
async fn main() -> anyhow::Result<()> {
    harbor::bootstrap::run().await
}
