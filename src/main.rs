use anyhow::{Context, Result};
use chat_completion_client::renderer::ReplyRenderer;
use chat_completion_client::ChatClient;
use colored::*;
use std::env;
use tracing_subscriber::EnvFilter;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const DEFAULT_USER_PROMPT: &str = "Tell me a joke.";
const TEMPERATURE: f64 = 0.7;

fn debug_requested() -> bool {
    env::var("CHAT_DEBUG")
        .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let base_url = env::var("AZURE_OPENAI_API_URL").context("AZURE_OPENAI_API_URL must be set")?;
    let api_key = env::var("AZURE_OPENAI_API_KEY").context("AZURE_OPENAI_API_KEY must be set")?;
    let model = env::var("AZURE_MODEL").context("AZURE_MODEL must be set")?;

    let mut args = env::args().skip(1);
    let user_prompt = args.next().unwrap_or_else(|| DEFAULT_USER_PROMPT.to_string());
    let system_prompt = args.next().unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let client = ChatClient::new(base_url, api_key, model);
    client.set_debug(debug_requested());

    match client.complete(&system_prompt, &user_prompt, TEMPERATURE).await {
        Ok(response) => {
            println!("{}", "Response:".green().bold());
            println!("{}", ReplyRenderer::for_terminal().render(&response).cyan());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(1);
        }
    }
}
