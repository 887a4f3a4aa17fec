//! Concurrent extraction demo.
//!
//! Shares one client across several tasks and reports each outcome.
//!
//! Run with: `BITBUFFET_API_KEY=your-key cargo run --example concurrent_extraction`

use bitbuffet::{Client, Error, ExtractArgs, ExtractConfig, ExtractionResult, TypedSchema};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;

fn get_api_key() -> String {
    std::env::var("BITBUFFET_API_KEY").expect("BITBUFFET_API_KEY environment variable is required")
}
fn get_base_url() -> String {
    std::env::var("BITBUFFET_BASE_URL").unwrap_or_else(|_| bitbuffet::DEFAULT_BASE_URL.into())
}

const URLS: &[&str] = &[
    "https://www.bbc.co.uk/news",
    "https://www.theguardian.com/international",
    "https://news.ycombinator.com",
];

#[derive(Debug, Deserialize, JsonSchema)]
struct Headline {
    title: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct FrontPage {
    headlines: Vec<Headline>,
}

fn header(text: &str) {
    println!();
    println!("{}", format!(" {} ", text).on_blue().bold());
    println!();
}

fn success(text: &str) {
    println!("{} {}", "✔".green(), text);
}

fn error(text: &str) {
    println!("{} {}", "✖".red(), text);
}

fn progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let client = Client::builder(get_api_key())
        .base_url(get_base_url())
        .user_agent_suffix("ConcurrentDemo/1.0")
        .timeout(Duration::from_secs(90))
        .build()?;

    header(&format!("BitBuffet Rust SDK {}", bitbuffet::SDK_VERSION));

    let pb = progress(URLS.len() as u64 * 2);
    let mut tasks = Vec::new();

    for url in URLS {
        let json_client = client.clone();
        let pb_json = pb.clone();
        tasks.push(tokio::spawn(async move {
            let args = ExtractArgs::schema(TypedSchema::<FrontPage>::new())
                .with_config(ExtractConfig::default().prompt("Top five headlines only"));
            let result = json_client.extract(*url, args).await;
            pb_json.inc(1);
            (*url, result)
        }));

        let md_client = client.clone();
        let pb_md = pb.clone();
        tasks.push(tokio::spawn(async move {
            let result = md_client
                .extract_markdown(*url, ExtractConfig::default())
                .await
                .map(ExtractionResult::<FrontPage>::Markdown);
            pb_md.inc(1);
            (*url, result)
        }));
    }

    let mut outcomes = Vec::new();
    for task in tasks {
        if let Ok(outcome) = task.await {
            outcomes.push(outcome);
        }
    }
    pb.finish_and_clear();

    for (url, result) in outcomes {
        match result {
            Ok(ExtractionResult::Structured(page)) => {
                success(&format!("{} - {} headlines", url, page.headlines.len()));
                for headline in page.headlines.iter().take(5) {
                    println!("    {}", headline.title.dimmed());
                }
            }
            Ok(ExtractionResult::Markdown(md)) => {
                success(&format!("{} - {} chars of markdown", url, md.len()));
            }
            Err(e) if e.is_timeout() => error(&format!("{} - timed out", url)),
            Err(e) => error(&format!("{} - {}", url, e)),
        }
    }

    Ok(())
}
