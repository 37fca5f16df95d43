#[tokio::main]
async fn main() -> std::io::Result<()> {
    rl_car_server::run_with_config().await
}
