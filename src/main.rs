mod backend;
mod config;
mod context;
mod dispatch;
mod fuzzy;
mod intent;
mod lexicon;
mod listener;
mod normalize;
mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use backend::linux::linux_backend;
use config::Config;
use dispatch::Dispatcher;
use lexicon::Lexicon;
use listener::{ConsoleSpeech, ConsoleWake, Listener};
use pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "bellhop", about = "Voice-driven desktop command dispatcher")]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive loop: every line typed is one utterance (default)
    Repl,
    /// Dispatch a single utterance and print the reply
    Once {
        /// The utterance, e.g. `bellhop once open firefox`
        text: Vec<String>,
    },
    /// List the configured application lexicon
    Apps,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config);
    let lexicon = Lexicon::with_overrides(config.lexicon.as_ref());

    match cli.command.unwrap_or(Command::Repl) {
        Command::Apps => {
            for (name, command) in lexicon.entries() {
                println!("{name:24} {command}");
            }
            Ok(())
        }
        Command::Once { text } => {
            let mut pipeline = build_pipeline(&config, lexicon);
            let outcome = pipeline.handle_utterance(&text.join(" "));
            println!("{}", outcome.message());
            Ok(())
        }
        Command::Repl => {
            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();
            ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))?;

            println!(
                "{} console mode. The wake word \"{}\" is implied; every line is one utterance.",
                config.name, config.wake_word
            );
            println!("Say 'stop listening' (or press Ctrl-C) to quit.");

            let name = config.name.clone();
            let pipeline = build_pipeline(&config, lexicon);
            let speech = ConsoleSpeech::new(running.clone());
            let mut listener = Listener::new(ConsoleWake, speech, pipeline, running, name);
            listener.run()
        }
    }
}

fn build_pipeline(config: &Config, lexicon: Lexicon) -> Pipeline {
    let backend = linux_backend(&config.power, &lexicon);
    let dispatcher =
        Dispatcher::new(backend, config.fuzzy_threshold, config.screenshot_dir.clone());
    Pipeline::new(lexicon, dispatcher)
}
