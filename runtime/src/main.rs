//! disaster-relay binary

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    disaster_relay_runtime::run().await
}
