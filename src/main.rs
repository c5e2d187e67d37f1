use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use tandem::language::{self, LANGUAGES};
use tandem::{
    Config, ConsoleSpeechOutput, ConversationLog, ConversationSession, LanguagePair, OutputError,
    PhrasebookTranslator, Providers, QueuedSpeechInput, Side, TranslationProvider, TurnError,
};

/// Tandem - two-party voice interpreter
#[derive(Parser)]
#[command(name = "tandem", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List supported languages
    Languages,
    /// Translate a single piece of text
    Translate {
        /// Text to translate
        text: String,
        /// Source language code
        #[arg(long)]
        from: Option<String>,
        /// Target language code
        #[arg(long)]
        to: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run an interactive conversation (default)
    Converse {
        /// Language of the FROM side
        #[arg(long)]
        from: Option<String>,
        /// Language of the TO side
        #[arg(long)]
        to: Option<String>,
        /// Allow both sides to use the same language
        #[arg(long)]
        allow_same_language: bool,
        /// Print translations instead of speaking them
        #[arg(long)]
        text_only: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,tandem=info",
        1 => "info,tandem=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Some(Command::Languages) => {
            list_languages();
            Ok(())
        }
        Some(Command::Translate {
            text,
            from,
            to,
            json,
        }) => {
            let pair = override_pair(&config.languages, from, to)?;
            translate_once(&config, &pair, &text, json).await
        }
        Some(Command::Converse {
            from,
            to,
            allow_same_language,
            text_only,
        }) => {
            config.languages = override_pair(&config.languages, from, to)?;
            config.allow_same_language |= allow_same_language;
            converse(&config, text_only).await
        }
        None => converse(&config, false).await,
    }
}

/// Apply command-line language overrides on top of the configured pair
fn override_pair(
    base: &LanguagePair,
    from: Option<String>,
    to: Option<String>,
) -> anyhow::Result<LanguagePair> {
    let pair = LanguagePair::new(
        from.unwrap_or_else(|| base.from.clone()),
        to.unwrap_or_else(|| base.to.clone()),
    );
    pair.validate()?;
    Ok(pair)
}

fn list_languages() {
    for lang in LANGUAGES {
        println!("{:<4}{} {:<12} {}", lang.code, lang.flag, lang.name, lang.region);
    }
}

async fn translate_once(
    config: &Config,
    pair: &LanguagePair,
    text: &str,
    json: bool,
) -> anyhow::Result<()> {
    let translator = PhrasebookTranslator::with_latency(config.translation.latency);
    let translated = translator.translate(text, &pair.from, &pair.to).await?;

    if json {
        let out = serde_json::json!({
            "source_text": text,
            "translated_text": translated,
            "from_lang": pair.from,
            "to_lang": pair.to,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{translated}");
    }

    Ok(())
}

const HELP: &str = "\
Type what the active side says and press enter.
  /from, /to   choose who speaks next
  /swap        swap the two languages
  /history     show the conversation so far
  /export      print the conversation as JSON
  /quit        leave";

async fn converse(config: &Config, text_only: bool) -> anyhow::Result<()> {
    let input = Arc::new(QueuedSpeechInput::new());
    let output = if text_only {
        ConsoleSpeechOutput::muted()
    } else {
        ConsoleSpeechOutput::new(config.voice.speech_rate)
    };
    let providers = Providers {
        input: input.clone(),
        translator: Arc::new(PhrasebookTranslator::with_latency(
            config.translation.latency,
        )),
        output: Arc::new(output),
    };

    let mut session =
        ConversationSession::new(config.languages.clone(), providers, ConversationLog::new())
            .with_same_language_allowed(config.allow_same_language);

    println!("Conversation: {}", session.controller().pair());
    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(&session)?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => {}
            "/quit" | "/exit" => break,
            "/help" => println!("{HELP}"),
            "/from" => session.select_active_side(Side::From),
            "/to" => session.select_active_side(Side::To),
            "/swap" => {
                session.swap_languages();
                println!("Conversation: {}", session.controller().pair());
            }
            "/history" => print_history(session.log()),
            "/export" => println!("{}", session.log().to_json()?),
            cmd if cmd.starts_with('/') => println!("unknown command {cmd}, try /help"),
            speech => match session.run_turn_with(|| input.push(speech)).await {
                Ok(()) => {}
                Err(TurnError::Output(OutputError::NoSupport)) => {
                    if let Some(turn) = session.log().last() {
                        println!(
                            "💬 {} {}: {}",
                            language::flag(&turn.target_lang),
                            language::name(&turn.target_lang),
                            turn.translated_text
                        );
                    }
                }
                Err(e) => println!("⚠ {e}"),
            },
        }
    }

    println!("{} turn(s) recorded", session.log().len());
    Ok(())
}

fn prompt(session: &ConversationSession) -> std::io::Result<()> {
    let controller = session.controller();
    let side = controller.active_side();
    let speaking = controller.pair().language_for(side);
    let listening = controller.pair().language_for(side.other());

    print!(
        "[{} {} ▸ {} {}] > ",
        language::flag(speaking),
        language::name(speaking),
        language::flag(listening),
        language::name(listening)
    );
    std::io::stdout().flush()
}

fn print_history(log: &ConversationLog) {
    if log.is_empty() {
        println!("No turns yet.");
        return;
    }

    for turn in log.turns() {
        println!(
            "{} [{}] {} {}: {}\n         {} {}: {}",
            turn.timestamp.format("%H:%M:%S"),
            turn.speaker,
            language::flag(&turn.source_lang),
            language::name(&turn.source_lang),
            turn.original_text,
            language::flag(&turn.target_lang),
            language::name(&turn.target_lang),
            turn.translated_text
        );
    }
}
