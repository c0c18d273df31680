#[tokio::main]
async fn main() -> anyhow::Result<()> {
    matchup_backend::run().await
}
