//! `docchat chat` — Interactive or single-message chat about a document.

use docchat_session::{PromptLibrary, Session, SessionError, TurnOutcome, extract_text};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(
    file: PathBuf,
    prompt: Option<String>,
    message: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let oracle = docchat_providers::build_from_config(&config)
        .map_err(|e| format!("{e}\n  Run `docchat doctor` to check your setup."))?;
    let library = super::open_prompts(&config)?;

    let (prompt_name, prompt_text) = match &prompt {
        Some(wanted) => {
            let found = library.resolve(wanted).ok_or_else(|| {
                format!("No prompt named or with id '{wanted}' (see `docchat prompts list`)")
            })?;
            (found.name.clone(), found.text.clone())
        }
        None => match library.get(&config.prompts.default_id) {
            Some(p) => (p.name.clone(), p.text.clone()),
            None => ("default".to_string(), library.default_prompt().to_string()),
        },
    };

    let extracted = extract_text(&file)?;
    let mut session = Session::new(oracle, super::budget_from(&config))
        .with_system_prompt(prompt_text)
        .with_max_history_turns(config.history.max_turns);

    let ceiling = session.budget().ceiling();
    let document = session.load_document(extracted.name, extracted.text).await?;
    let loaded_line = format!(
        "{}: {}",
        document.name(),
        super::usage_line(document.token_count(), ceiling)
    );

    if let Some(msg) = message {
        // Single message mode
        eprintln!("  {loaded_line}");
        eprint!("  Thinking...");
        let outcome = session.ask(&msg).await;
        eprint!("\r              \r");
        match outcome? {
            TurnOutcome::Answered { response, .. } => println!("{response}"),
            TurnOutcome::TooLarge(report) => {
                return Err(super::describe_too_large(&report).into());
            }
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  DocChat — Interactive Mode");
    println!();
    println!("  Document:  {loaded_line}");
    println!("  Model:     {} ({})", config.model, config.provider);
    println!("  Prompt:    {prompt_name}");
    println!();
    println!("  Commands: /prompt <name or id>, /history, exit");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF (Ctrl+D)
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        if line == "/prompt" || line.starts_with("/prompt ") {
            switch_prompt(&mut session, &library, line["/prompt".len()..].trim());
            continue;
        }
        if line == "/history" {
            println!("  {} turns in history", session.history().len());
            for entry in super::history_lines(session.history()) {
                println!("  {entry}");
            }
            continue;
        }

        eprint!("  ...");
        let outcome = session.ask(line).await;
        eprint!("\r     \r");

        match outcome {
            Ok(TurnOutcome::Answered {
                response,
                turns_included,
                prompt_tokens,
            }) => {
                println!();
                for line in response.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
                tracing::debug!(turns_included, prompt_tokens, "Turn complete");
            }
            Ok(TurnOutcome::TooLarge(report)) => {
                eprintln!("  [Too large] {}", super::describe_too_large(&report));
                println!();
            }
            Err(SessionError::Oracle(e)) if !e.is_unavailable() => {
                eprintln!("  [Blocked] {e}");
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

fn switch_prompt(session: &mut Session, library: &PromptLibrary, wanted: &str) {
    if wanted.is_empty() {
        for p in library.list() {
            println!("  {:<38} {}", p.id, p.name);
        }
        return;
    }
    match library.resolve(wanted) {
        Some(p) => {
            session.set_system_prompt(p.text.clone());
            println!("  Switched to prompt: {}", p.name);
        }
        None => eprintln!("  No prompt named or with id '{wanted}'"),
    }
}
