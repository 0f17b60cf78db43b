#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sourcecheck_server::start().await
}
