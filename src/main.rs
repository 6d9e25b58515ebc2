//! Fortune Career — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger once (`RUST_LOG` > config)
//!   4. Build the LLM provider and the oracle
//!   5. Spawn Ctrl-C → shutdown signal watcher
//!   6. Drive the consultation on the console until quit, EOF or shutdown;
//!      Ctrl-C also abandons an in-flight provider call

use std::future::Future;
use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use fortune_career::config::{self, Config};
use fortune_career::consultation::Consultation;
use fortune_career::error::AppError;
use fortune_career::export::Report;
use fortune_career::llm::providers;
use fortune_career::logger;
use fortune_career::oracle::Oracle;
use fortune_career::quiz::{ChartValues, Question};
use fortune_career::session::{FlowError, Stage};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — the file is optional.
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level, false)?;

    let provider = providers::build(&config.llm, config.llm_api_key.clone())?;
    info!(
        app_name = %config.app_name,
        provider = provider.name(),
        export_dir = %config.export.dir.display(),
        "config loaded"
    );

    let oracle = Oracle::from_config(provider, &config);
    let mut consultation = Consultation::new(oracle);

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — shutting down");
            ctrlc_token.cancel();
        }
    });

    let mut console = Console::new(shutdown);
    drive(&mut consultation, &mut console, &config).await?;
    info!(session_id = %consultation.session().id, "console closed");
    Ok(())
}

/// Line-oriented stdin that gives up on Ctrl-C or EOF.
struct Console {
    lines: Lines<BufReader<Stdin>>,
    shutdown: CancellationToken,
}

impl Console {
    fn new(shutdown: CancellationToken) -> Self {
        Self { lines: BufReader::new(tokio::io::stdin()).lines(), shutdown }
    }

    /// Print `prompt` and read one trimmed line.  `None` means stop.
    async fn read(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => {
                println!();
                None
            }

            line = self.lines.next_line() => match line {
                Ok(Some(input)) => Some(input.trim().to_string()),
                Ok(None) => {
                    info!("stdin closed");
                    None
                }
                Err(e) => {
                    warn!("stdin read error: {e}");
                    None
                }
            },
        }
    }

    /// Await `fut` unless Ctrl-C arrives first.  `None` means stop.
    async fn until_shutdown<F: Future>(&self, fut: F) -> Option<F::Output> {
        or_shutdown(&self.shutdown, fut).await
    }
}

async fn or_shutdown<F: Future>(shutdown: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!("shutdown during provider call — abandoning it");
            None
        }

        output = fut => Some(output),
    }
}

async fn drive(consultation: &mut Consultation, console: &mut Console, config: &Config) -> Result<(), AppError> {
    loop {
        match consultation.stage() {
            Stage::Intro => {
                println!("─────────────────────────────────");
                println!(" AI Fortune Career  運命の適職診断");
                println!("─────────────────────────────────");
                let Some(input) = console.read("Enter で診断を始める (q で終了) > ").await else { return Ok(()) };
                if input == "q" {
                    return Ok(());
                }
                match consultation.begin() {
                    Ok(_) => {}
                    Err(FlowError::MissingCredential) => {
                        println!("API キーが設定されていません。LLM_API_KEY を設定してください。");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Stage::Questionnaire => {
                if !questionnaire(consultation, console).await? {
                    return Ok(());
                }
                let Some(submitted) = console.until_shutdown(consultation.submit()).await else { return Ok(()) };
                match submitted {
                    Ok(opening) => println!("\n🔮 {}\n", opening.get()),
                    Err(FlowError::Validation(e)) => println!("{e}"),
                    Err(e) => return Err(e.into()),
                }
            }
            Stage::Dialogue => {
                let Some(input) = console.read("あなた (/done で結果へ) > ").await else { return Ok(()) };
                if input.is_empty() {
                    continue;
                }
                if input == "/done" {
                    if !reveal(consultation, console).await? {
                        return Ok(());
                    }
                    continue;
                }
                let Some(said) = console.until_shutdown(consultation.say(&input)).await else { return Ok(()) };
                match said {
                    Ok(reply) => println!("\n🔮 {}\n", reply.get()),
                    Err(FlowError::TurnLimit { max }) => {
                        println!("(ヒアリングは {max} 回までです。結果を表示します。)");
                        if !reveal(consultation, console).await? {
                            return Ok(());
                        }
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Stage::Result => {
                let Some(input) = console.read("e: 鑑定書を保存 / r: もう一度 / q: 終了 > ").await else { return Ok(()) };
                match input.as_str() {
                    "e" => match console.until_shutdown(consultation.export_html(&config.export)).await {
                        Some(Ok(path)) => println!("保存しました: {}", path.display()),
                        Some(Err(e)) => println!("保存に失敗しました: {e}"),
                        None => return Ok(()),
                    },
                    "r" => {
                        consultation.restart();
                    }
                    "q" => return Ok(()),
                    _ => {
                        if !reveal(consultation, console).await? {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Ask every unanswered question.  Returns `false` when the console closed.
async fn questionnaire(consultation: &mut Consultation, console: &mut Console) -> Result<bool, AppError> {
    for (index, question) in consultation.questions().iter().enumerate() {
        if consultation.session().answers().get(question.id).is_some() {
            continue;
        }
        print_question(index, question);
        loop {
            let Some(input) = console.read("番号 > ").await else { return Ok(false) };
            let choice = input.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
            match choice.and_then(|i| question.options.get(i)) {
                Some(option) => {
                    consultation.answer(question.id, option.text)?;
                    debug!(question = question.id, "answered");
                    break;
                }
                None => println!("1〜{} の番号で答えてください。", question.options.len()),
            }
        }
    }
    Ok(true)
}

fn print_question(index: usize, question: &Question) {
    println!("\nQ{}. {}", index + 1, question.prompt);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option.text);
    }
}

/// Reveal and print the result.  Returns `false` on shutdown.
async fn reveal(consultation: &mut Consultation, console: &Console) -> Result<bool, AppError> {
    let Some(report) = console.until_shutdown(consultation.reveal()).await else { return Ok(false) };
    print_report(&report?);
    Ok(true)
}

fn print_report(report: &Report) {
    println!("\n═════════════════════════════════");
    println!(" {}", report.profile.subtitle);
    println!(" {}  ({})", report.profile.title, report.classification);
    println!("═════════════════════════════════");
    println!("“{}”\n", report.analysis.desc);
    for (label, value) in ChartValues::LABELS.iter().zip(report.chart.values()) {
        println!("  {label}: {value:.1}");
    }
    println!("\n今伸ばすべきスキル: {}", report.analysis.skills.join(" / "));
    println!("おすすめインターン・適職: {}", report.analysis.jobs.join(" / "));
    println!("\n📜 {}\n", report.advice);
}
