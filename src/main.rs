//! Console chat front-end over the budgeted context window

use anyhow::Context;
use context_window::{
    ChatCompletionsClient, ChatMessage, LlmSummarizer, Settings, TiktokenCounter,
    TurnOrchestrator, WindowBudget,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer concisely and stay on topic.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env().context("loading settings")?;
    let counter = Arc::new(
        TiktokenCounter::for_encoding(&settings.tokenizer_encoding)
            .context("resolving tokenizer encoding")?,
    );
    let budget = WindowBudget::new(settings.max_context_tokens, settings.reply_max_tokens);
    let client =
        Arc::new(ChatCompletionsClient::new(&settings).context("building chat client")?);
    let summarizer = Arc::new(LlmSummarizer::new(client.clone()));
    let orchestrator =
        TurnOrchestrator::new(counter, budget, summarizer, client, settings.temperature);

    let system_prompt = std::env::var("CHAT_SYSTEM_PROMPT")
        .unwrap_or_else(|_| DEFAULT_SYSTEM_PROMPT.to_string());
    let mut conversation = vec![ChatMessage::system(system_prompt)];

    println!("chat ready; empty line or \"quit\" to exit");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() || line == "quit" || line == "exit" {
            break;
        }

        // A failed turn is reported and the conversation stays as it
        // was; the next line starts a fresh attempt.
        match orchestrator.run_turn(&conversation, line).await {
            Ok(outcome) => {
                println!("{}", outcome.reply);
                println!(
                    "[prompt {}/{} tokens; trimmed={}, summarized={}]",
                    outcome.prompt_tokens,
                    outcome.prompt_budget,
                    outcome.trimmed,
                    outcome.summarized
                );
                conversation = outcome.conversation;
            }
            Err(e) => eprintln!("turn failed: {e}"),
        }
    }

    Ok(())
}
