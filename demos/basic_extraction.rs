//! Basic extraction example.
//!
//! Extracts a recipe as structured data, then the same page as markdown.
//!
//! Run with: `BITBUFFET_API_KEY=your-key cargo run --example basic_extraction`

use bitbuffet::{Client, ExtractConfig, ReasoningEffort, TypedSchema};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
struct Rating {
    rating: f64,
    count: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct Recipe {
    title: String,
    author: String,
    rating: Option<Rating>,
    ingredients: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), bitbuffet::Error> {
    // Create a client with your API key
    let api_key = std::env::var("BITBUFFET_API_KEY").expect("BITBUFFET_API_KEY must be set");
    let client = Client::new(api_key)?;

    let url = "https://www.allrecipes.com/recipe/21014/good-old-fashioned-pancakes/";

    // Structured extraction: the schema selects JSON mode
    let recipe = client
        .extract_json(
            url,
            TypedSchema::<Recipe>::new(),
            ExtractConfig::default()
                .reasoning_effort(ReasoningEffort::Medium)
                .temperature(0.2),
        )
        .await?;

    println!("Extracted recipe: {:#?}", recipe);

    // Markdown extraction: no schema
    let markdown = client
        .extract_markdown(url, ExtractConfig::default())
        .await?;

    println!("Markdown ({} chars):", markdown.len());
    println!("{}", markdown.lines().take(10).collect::<Vec<_>>().join("\n"));

    Ok(())
}
