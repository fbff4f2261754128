use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    postwise_server::run().await
}
