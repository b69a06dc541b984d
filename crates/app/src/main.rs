use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use flashcards_core::model::QuestionId;
use flashcards_core::session::{Intent, StudyMode};
use services::{RandomPicker, StudyService};
use storage::repository::Storage;
use storage::rest::StoreConfig;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--store-url <url>] [--api-key <key>] [--table <name>]");
    eprintln!("  cargo run -p app -- --offline");
    eprintln!();
    eprintln!("Without a configured store the bundled sample deck is used.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FLASHCARDS_STORE_URL, FLASHCARDS_API_KEY, FLASHCARDS_TABLE");
}

struct Args {
    config: Option<StoreConfig>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut store_url = std::env::var("FLASHCARDS_STORE_URL").ok();
        let mut api_key = std::env::var("FLASHCARDS_API_KEY").ok();
        let mut table = std::env::var("FLASHCARDS_TABLE")
            .unwrap_or_else(|_| StoreConfig::DEFAULT_TABLE.to_owned());
        let mut offline = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--store-url" => store_url = Some(require_value(args, "--store-url")?),
                "--api-key" => api_key = Some(require_value(args, "--api-key")?),
                "--table" => table = require_value(args, "--table")?,
                "--offline" => offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let config = match (offline, store_url, api_key) {
            (true, ..) => None,
            (false, Some(base_url), Some(api_key))
                if !base_url.trim().is_empty() && !api_key.trim().is_empty() =>
            {
                Some(StoreConfig {
                    base_url,
                    api_key,
                    table,
                })
            }
            _ => None,
        };

        Ok(Self { config })
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list           show all questions with selection and mastery");
    println!("  toggle <id>    select or deselect a question");
    println!("  unknown        select every question not yet known");
    println!("  start          enter quiz mode on the selection (or everything)");
    println!("  answer         reveal the current question's answer");
    println!("  know / dont    mark the current question and draw the next one");
    println!("  next           draw the next question without marking");
    println!("  back           return to browsing");
    println!("  reset          mark every question as unknown");
    println!("  progress       show mastery progress");
    println!("  quit           exit");
}

fn print_list(service: &StudyService) {
    for question in service.state().questions() {
        let selected = if service.state().is_selected(question.id()) {
            "*"
        } else {
            " "
        };
        let mastery = if question.known() { "known" } else { "unknown" };
        println!("{selected} {:<8} {:<8} {}", question.id(), mastery, question.prompt());
    }
}

fn print_current(service: &StudyService) {
    match service.current_question() {
        Some(question) => println!("[{}] {}", question.id(), question.prompt()),
        None => println!("No question available. Select some questions and `start` again."),
    }
}

fn print_progress(service: &StudyService) {
    let progress = service.progress();
    println!(
        "{} of {} questions mastered ({}%)",
        progress.known, progress.total, progress.percentage
    );
}

/// Push queued store writes and surface failures as transient notices. The
/// local changes are kept either way.
async fn flush_and_report(service: &mut StudyService) {
    service.flush_syncs().await;
    for failure in service.take_failures() {
        println!("(sync failed, kept local change: {})", failure.message);
    }
}

async fn mark_current_and_advance(service: &mut StudyService, known: bool) {
    let Some(id) = service.current_question().map(|q| q.id().clone()) else {
        println!("Not quizzing right now.");
        return;
    };

    let intent = if known {
        Intent::MarkKnown(id)
    } else {
        Intent::MarkUnknown(id)
    };
    service.dispatch(intent);
    flush_and_report(service).await;
    advance(service);
}

fn advance(service: &mut StudyService) {
    service.dispatch(Intent::Advance);
    if service.state().mode() == StudyMode::Browsing {
        println!("Nothing left to quiz on; back to browsing.");
    } else {
        print_current(service);
    }
}

async fn handle_command(service: &mut StudyService, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("help") => print_help(),
        Some("list") => print_list(service),
        Some("toggle") => match parts.next() {
            Some(raw) => {
                let id = QuestionId::new(raw);
                service.dispatch(Intent::ToggleSelection(id.clone()));
                if service.state().is_selected(&id) {
                    println!("Selected {id}.");
                } else {
                    println!("Deselected {id}.");
                }
            }
            None => println!("toggle requires a question id"),
        },
        Some("unknown") => {
            service.dispatch(Intent::SelectAllUnknown);
            println!("Selected {} unknown questions.", service.state().selected_ids().len());
        }
        Some("start") => {
            let applied = service.dispatch(Intent::StartQuiz);
            if applied.selected_all_fallback {
                println!("No questions selected; using all questions instead.");
            }
            print_current(service);
        }
        Some("answer") => match service.current_question() {
            Some(question) => println!("{}", question.answer()),
            None => println!("Not quizzing right now."),
        },
        Some("know") => mark_current_and_advance(service, true).await,
        Some("dont") => mark_current_and_advance(service, false).await,
        Some("next") => {
            if service.state().mode() == StudyMode::Quizzing {
                advance(service);
            } else {
                println!("Not quizzing right now.");
            }
        }
        Some("back") => {
            service.dispatch(Intent::ReturnToBrowsing);
            println!("Back to browsing.");
        }
        Some("reset") => {
            service.dispatch(Intent::ResetProgress);
            flush_and_report(service).await;
            println!("Progress reset. All questions marked as unknown.");
        }
        Some("progress") => print_progress(service),
        Some("quit" | "exit") => return false,
        Some(other) => println!("Unknown command: {other} (try `help`)"),
    }
    true
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut iter = std::env::args().skip(1);
    let args = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let offline = args.config.is_none();
    let storage = Storage::from_config(args.config);
    let mut service = StudyService::new(Arc::clone(&storage.questions), Box::new(RandomPicker));

    // A failed initial load blocks the session; restarting the app is the
    // retry path.
    let count = service.load().await?;
    if offline {
        println!("No store configured; using the bundled sample deck.");
    }
    println!("Loaded {count} questions. Type `help` for commands.");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !handle_command(&mut service, line.trim()).await {
            break;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
