#[tokio::main]
async fn main() -> std::io::Result<()> {
    aquarium_server::run_with_config().await
}
