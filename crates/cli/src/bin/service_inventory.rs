use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    svcinv_cli::main_entry().await
}
