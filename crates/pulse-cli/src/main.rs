//! NewsPulse command-line interface
//!
//! ```bash
//! export NEWS_API_KEY=...            # NewsAPI
//! export NEWSDATAIO_API_KEY=...      # NewsData.io
//! export GOOGLE_API_KEY=...          # Gemini chatbot
//!
//! newspulse serve --addr 127.0.0.1:8501
//! newspulse fetch --category Business --language en
//! newspulse analyze --from-cache
//! newspulse chat --with-news
//!
//! # Any OpenAI-compatible endpoint instead of Gemini
//! OPENAI_API_BASE=http://localhost:1234/v1 OPENAI_MODEL=qwen2.5 newspulse --openai chat
//! ```

mod display;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pulse_llm::LLMProvider;
use pulse_llm::providers::OpenAIProvider;
use pulse_news::chat::gemini_provider;
use pulse_news::nlp::LlmStarClassifier;
use pulse_news::{
    Article, ExtendedCategory, NewsAggregator, NewsChatbot, NewsConfig, NewsPipeline,
};
use pulse_utils::LogFormat;
use pulse_web::AppState;
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "newspulse", version)]
#[command(about = "News analytics: fetch headlines, find trends, chat about them", long_about = None)]
struct Cli {
    /// Log output format (pretty or json)
    #[arg(long, env = "NEWSPULSE_LOG_FORMAT", default_value = "pretty", global = true)]
    log_format: LogFormat,

    /// Flat file holding the last fetch
    #[arg(long, env = "NEWSPULSE_CACHE_FILE", global = true)]
    cache_file: Option<PathBuf>,

    /// Articles requested per source
    #[arg(long, env = "NEWSPULSE_PAGE_SIZE", global = true)]
    page_size: Option<usize>,

    /// Use an OpenAI-compatible endpoint (OPENAI_API_BASE, OPENAI_MODEL) instead of Gemini
    #[arg(long, global = true)]
    openai: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web dashboard
    Serve {
        #[arg(long, env = "NEWSPULSE_ADDR", default_value = "127.0.0.1:8501")]
        addr: SocketAddr,
    },
    /// Fetch headlines and write them to the cache
    Fetch {
        #[command(flatten)]
        query: Query,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fetch (or load cached) headlines and run the full analysis
    Analyze {
        #[command(flatten)]
        query: Query,
        /// Analyse the cache file instead of fetching
        #[arg(long)]
        from_cache: bool,
        /// Fixed number of topics
        #[arg(long)]
        topics: Option<usize>,
        /// Rate sentiment with the language model instead of the word lists
        #[arg(long)]
        llm_sentiment: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chat with the news assistant
    Chat {
        /// Give the assistant the cached headlines as context
        #[arg(long)]
        with_news: bool,
    },
}

#[derive(clap::Args, Debug)]
struct Query {
    /// Category label or keyword
    #[arg(short, long, default_value = "Business")]
    category: ExtendedCategory,
    /// News language code
    #[arg(short, long, default_value = "en")]
    language: String,
}

impl Cli {
    fn config(&self) -> anyhow::Result<NewsConfig> {
        let mut builder = NewsConfig::builder().with_env_keys();
        if let Some(path) = &self.cache_file {
            builder = builder.cache_file(path);
        }
        if let Some(size) = self.page_size {
            builder = builder.page_size(size);
        }
        builder.build().context("invalid configuration")
    }

    /// Model client and model name for chat and LLM sentiment
    fn llm(&self, config: &NewsConfig) -> anyhow::Result<(Option<Arc<dyn LLMProvider>>, String)> {
        if self.openai {
            let provider: Arc<dyn LLMProvider> = Arc::new(OpenAIProvider::from_env()?);
            let model =
                pulse_utils::env_var("OPENAI_MODEL").unwrap_or_else(|| config.chat_model.clone());
            return Ok((Some(provider), model));
        }
        Ok((gemini_provider(config)?, config.chat_model.clone()))
    }
}

async fn load_or_fetch(
    config: &NewsConfig,
    query: &Query,
    from_cache: bool,
) -> anyhow::Result<Vec<Article>> {
    let aggregator = NewsAggregator::new(config)?;
    if from_cache {
        let articles = aggregator.cache().load().await?;
        info!(count = articles.len(), path = %aggregator.cache().path().display(), "Loaded cache");
        return Ok(articles);
    }
    Ok(aggregator
        .get_all_news(query.category, &query.language)
        .await?)
}

async fn chat_repl(
    config: &NewsConfig,
    provider: Option<Arc<dyn LLMProvider>>,
    with_news: bool,
) -> anyhow::Result<()> {
    let mut chatbot = NewsChatbot::new(provider, &config.chat_model);
    if !chatbot.is_enabled() {
        eprintln!("Warning: GOOGLE_API_KEY not set, the assistant cannot answer");
    }

    if with_news {
        let articles = NewsAggregator::new(config)?.cache().load().await?;
        let report = NewsPipeline::from_config(config).run(articles).await?;
        chatbot.set_context(&report);
        println!("Loaded {} cached headlines as context", report.articles.len());
    }

    println!("Ask NewsPulse AI. Commands: /clear, /history, /exit\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("you> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        match input.trim() {
            "" => {}
            "/exit" | "/quit" => break,
            "/clear" => {
                chatbot.clear();
                println!("History cleared\n");
            }
            "/history" => {
                for turn in chatbot.history().history() {
                    println!("you> {}\nai>  {}\n", turn.user, turn.bot);
                }
            }
            prompt => {
                let reply = chatbot.send(prompt).await;
                println!("ai>  {reply}\n");
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    pulse_utils::init_tracing_with(cli.log_format, "info");

    let mut config = cli.config()?;
    let (provider, model) = cli.llm(&config)?;
    config.chat_model = model;

    match cli.command {
        Command::Serve { addr } => {
            let state = AppState::from_config(config)?.with_chat_provider(provider);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            pulse_web::serve(listener, state).await?;
        }
        Command::Fetch { query, json } => {
            let articles = load_or_fetch(&config, &query, false).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                println!("{}", display::articles_table(&articles));
            }
        }
        Command::Analyze {
            query,
            from_cache,
            topics,
            llm_sentiment,
            json,
        } => {
            let articles = load_or_fetch(&config, &query, from_cache).await?;
            let mut pipeline =
                NewsPipeline::from_config(&config).with_n_topics(topics.or(config.n_topics));
            if llm_sentiment {
                let provider = provider.context("--llm-sentiment needs GOOGLE_API_KEY or --openai")?;
                pipeline = pipeline.with_classifier(Arc::new(LlmStarClassifier::new(
                    provider,
                    &config.chat_model,
                )));
            }
            let report = pipeline.run(articles).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", display::report_tables(&report));
            }
        }
        Command::Chat { with_news } => chat_repl(&config, provider, with_news).await?,
    }

    Ok(())
}
