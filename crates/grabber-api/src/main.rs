use grabber_api::setup;
use grabber_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (cache, storage, downloader, routes)
    let (state, router) = setup::initialize_app(config.clone()).await?;

    // Start the server
    setup::server::start_server(&config, state, router).await?;

    Ok(())
}
