use anyhow::Context;
use step_fetch::{FetchConfig, StepFetcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .context("usage: fetch_step <http(s)-url>")?;

    let config = FetchConfig::builder()
        .user_agent("step-fetch-demo/0.1")
        .build()?;
    let fetcher = StepFetcher::from_config(&config);

    let text = fetcher.fetch_text(&url).await?;

    println!("Fetched {} bytes from {}", text.len(), url);
    if let Some(first) = text.lines().next() {
        println!("First line: {}", first);
    }

    Ok(())
}
