//! CLI binary for hearth.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use hearth::agent::{AgentError, LogHooks, LoopConfig, RunIds, TurnOutcome, builtin};
use hearth::audio::list_devices;
use hearth::config::HearthConfig;
use hearth::crawl::{CrawlClient, CrawlRequest, DigestMode, shape};
use hearth::llm::{OpenAiClient, OpenAiConfig};
use hearth::stt::Listener;
use hearth::tools::builtin_registry;
use hearth::tts::{PiperVoice, Speaker};
use hearth::{Agent, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Hearth: a local home assistant.
#[derive(Parser)]
#[command(name = "hearth", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, env = "HEARTH_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Interactive text conversation.
    Chat {
        /// Also speak each reply.
        #[arg(long)]
        speak: bool,
    },

    /// Ask a single question and print the answer.
    Ask {
        /// The question.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Also speak the reply.
        #[arg(long)]
        speak: bool,
    },

    /// Spoken conversation: listen, answer, speak.
    Voice,

    /// Crawl one or more sites and print the digest.
    Crawl {
        /// Start URLs.
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,

        /// Maximum pages to visit.
        #[arg(long, default_value_t = 5)]
        max_pages: u32,

        /// Maximum link depth from the start URLs.
        #[arg(long, default_value_t = 1)]
        max_depth: u32,
    },

    /// Fetch a single page and print its text.
    Fetch {
        /// Page URL.
        url: String,
    },

    /// Search the web and print result URLs.
    Search {
        /// Search query.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// List available audio devices.
    Devices,

    /// Check that the crawler and inference server are reachable.
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = HearthConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let _log_guard = hearth::logging::init(&config.logging)?;

    match cli.command.unwrap_or(Command::Chat { speak: false }) {
        Command::Chat { speak } => run_chat(&config, speak).await,
        Command::Ask { text, speak } => run_ask(&config, &text.join(" "), speak).await,
        Command::Voice => run_voice(&config).await,
        Command::Crawl {
            urls,
            max_pages,
            max_depth,
        } => {
            let request = CrawlRequest::new(urls)
                .with_max_pages(max_pages)
                .with_max_depth(max_depth);
            run_crawl(&config, request, DigestMode::Crawl).await
        }
        Command::Fetch { url } => {
            let request = CrawlRequest::single_page(url).with_same_origin_only(false);
            run_crawl(&config, request, DigestMode::Fetch).await
        }
        Command::Search { query } => run_search(&config, &query.join(" ")).await,
        Command::Devices => run_devices(),
        Command::Doctor => run_doctor(&config).await,
    }
}

/// Build the configured agent with its tools, model and hooks.
fn build_agent(config: &HearthConfig) -> anyhow::Result<Arc<Agent>> {
    let definition = builtin(&config.agent.name)
        .ok_or_else(|| AgentError::UnknownAgent(config.agent.name.clone()))?;
    let registry = builtin_registry(config)?;
    let model = OpenAiClient::new(OpenAiConfig::from(&config.llm))?;
    let hooks = LogHooks::from_config(&config.logging);
    let loop_config = LoopConfig::default()
        .with_max_iterations(config.agent.max_iterations)
        .with_location(config.agent.location.clone());

    info!(
        agent = %definition.name,
        model = %config.llm.model,
        base_url = %config.llm.base_url,
        "starting agent"
    );
    Ok(Agent::build(
        &definition,
        &registry,
        Arc::new(model),
        Arc::new(hooks),
        loop_config,
    )?)
}

fn print_reply(outcome: &TurnOutcome, show_reasoning: bool) {
    if show_reasoning {
        if let Some(reasoning) = outcome.reasoning.as_deref().filter(|r| !r.trim().is_empty()) {
            println!("\n=== REASONING ===\n{}", reasoning.trim());
        }
        println!("\n=== RESPONDING ===\n{}\n", outcome.text.trim());
    } else {
        println!("{}", outcome.text.trim());
    }
}

/// Speak on a blocking section of the runtime. Playback failures are
/// reported, not fatal.
fn speak_reply(speaker: &mut Option<Speaker<PiperVoice>>, text: &str) {
    if let Some(speaker) = speaker.as_mut()
        && let Err(e) = tokio::task::block_in_place(|| speaker.speak(text))
    {
        warn!("could not speak reply: {e}");
    }
}

fn load_speaker(
    config: &HearthConfig,
    enabled: bool,
) -> anyhow::Result<Option<Speaker<PiperVoice>>> {
    if !enabled {
        return Ok(None);
    }
    let speaker = Speaker::from_config(&config.tts, &config.audio)?;
    Ok(Some(speaker))
}

async fn run_chat(config: &HearthConfig, speak: bool) -> anyhow::Result<()> {
    let agent = build_agent(config)?;
    let mut speaker = load_speaker(config, speak || config.agent.speak_replies)?;
    let mut session = Session::new(agent, RunIds::default());

    println!("Hearth v{}. Type 'exit' to quit.", env!("CARGO_PKG_VERSION"));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!(">: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        match session.send(line).await {
            Ok(outcome) => {
                print_reply(&outcome, config.logging.show_reasoning);
                speak_reply(&mut speaker, &outcome.text);
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

/// Whether a typed or spoken line asks to end the session.
fn is_exit(line: &str) -> bool {
    let phrase = line.trim().trim_end_matches(['.', '!', '?']).to_lowercase();
    matches!(phrase.as_str(), "exit" | "quit" | "goodbye" | "stop listening")
}

async fn run_ask(config: &HearthConfig, text: &str, speak: bool) -> anyhow::Result<()> {
    let agent = build_agent(config)?;
    let mut speaker = load_speaker(config, speak || config.agent.speak_replies)?;
    let outcome = hearth::agent::session::run_once(agent, text).await?;
    print_reply(&outcome, config.logging.show_reasoning);
    speak_reply(&mut speaker, &outcome.text);
    Ok(())
}

async fn run_voice(config: &HearthConfig) -> anyhow::Result<()> {
    let agent = build_agent(config)?;
    let mut listener = tokio::task::block_in_place(|| {
        Listener::from_config(&config.stt, &config.audio)
    })?;
    let mut speaker = load_speaker(config, true)?;
    let mut session = Session::new(agent, RunIds::default());

    println!("Ready! Speak into your microphone. Say \"goodbye\" or press Ctrl+C to stop.");
    loop {
        let heard = tokio::task::block_in_place(|| listener.listen())?;
        if is_exit(&heard) {
            info!("exit phrase heard, leaving voice loop");
            break;
        }

        match session.send(&heard).await {
            Ok(outcome) => {
                print_reply(&outcome, config.logging.show_reasoning);
                speak_reply(&mut speaker, &outcome.text);
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

async fn run_crawl(
    config: &HearthConfig,
    request: CrawlRequest,
    mode: DigestMode,
) -> anyhow::Result<()> {
    let client = CrawlClient::new(config.crawler.url.clone())?;
    let result = client.post_crawl(&request).await?;
    println!("{}", shape(&result, mode));
    Ok(())
}

async fn run_search(config: &HearthConfig, query: &str) -> anyhow::Result<()> {
    let results = hearth_search::search(query, &config.search.to_search_config()).await?;
    if results.is_empty() {
        println!("No results found for \"{query}\".");
    }
    for result in results {
        println!("{}", result.url);
    }
    Ok(())
}

fn run_devices() -> anyhow::Result<()> {
    let (inputs, outputs) = list_devices()?;

    println!("Input devices:");
    for name in &inputs {
        println!("  {name}");
    }
    println!("\nOutput devices:");
    for name in &outputs {
        println!("  {name}");
    }
    Ok(())
}

fn report(ok: bool, what: &str, detail: &str) {
    let mark = if ok { "ok" } else { "FAIL" };
    println!("[{mark:>4}] {what}: {detail}");
}

async fn run_doctor(config: &HearthConfig) -> anyhow::Result<()> {
    let crawler = CrawlClient::new(config.crawler.url.clone())?;
    match crawler.health().await {
        Ok(true) => report(true, "crawler", crawler.endpoint()),
        Ok(false) => report(false, "crawler", "health check did not report ok"),
        Err(e) => report(false, "crawler", &e.to_string()),
    }

    let model = OpenAiClient::new(OpenAiConfig::from(&config.llm))?;
    match model.list_models().await {
        Ok(models) if models.iter().any(|m| m == &config.llm.model) || models.is_empty() => {
            report(true, "inference server", &config.llm.base_url);
        }
        Ok(models) => report(
            false,
            "inference server",
            &format!(
                "model '{}' not served (available: {})",
                config.llm.model,
                models.join(", ")
            ),
        ),
        Err(e) => report(false, "inference server", &e.to_string()),
    }

    let stt_dir = &config.stt.model_dir;
    report(stt_dir.is_dir(), "stt model", &stt_dir.display().to_string());

    let voice = &config.tts.voice_model;
    report(voice.is_file(), "tts voice", &voice.display().to_string());

    let piper = match config.tts.piper_binary {
        Some(ref path) => Ok(path.clone()),
        None => which::which("piper"),
    };
    match piper {
        Ok(path) => report(path.exists(), "piper", &path.display().to_string()),
        Err(_) => report(false, "piper", "not found on PATH"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_phrases_end_typed_and_spoken_sessions() {
        assert!(is_exit("exit"));
        assert!(is_exit("  quit "));
        assert!(is_exit("Goodbye."));
        assert!(is_exit("Stop listening!"));
        assert!(!is_exit("goodbye to the rain tomorrow?"));
        assert!(!is_exit("what's the weather"));
    }
}
