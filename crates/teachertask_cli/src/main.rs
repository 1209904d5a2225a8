use clap::{CommandFactory, Parser};
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use teachertask_cli::cli::{Cli, Command, collect_config_overrides};
use teachertask_core::config::{
    Config, Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use teachertask_core::day_store::{DayStore, TaskUpdate};
use teachertask_core::error::AppError;
use teachertask_core::extract::{ExtractionGate, InputIntent, classify_input, extractor_from_env};
use teachertask_core::feedback::{Feedback, pick_message};
use teachertask_core::history_view::format_history;
use teachertask_core::model::{DayRecord, DraftTask, Task, TaskTime};
use teachertask_core::notify::{Notifier, deliver, notifier_from_env};
use teachertask_core::rank::RankedTasks;
use teachertask_core::storage::FileSlot;
use teachertask_core::storage::history_store;

const LOG_ENV_VAR: &str = "TEACHERTASK_LOG";

struct Session {
    config: Config,
    store: DayStore,
    notifier: Box<dyn Notifier>,
    gate: ExtractionGate,
    feedback: Feedback,
}

impl Session {
    fn open() -> Result<Self, AppError> {
        let loaded = load_config_with_fallback();
        if let Some(err) = loaded.error {
            log::warn!("using default configuration: {err}");
        }

        let path = history_store::store_path()?;
        let store = DayStore::open(Box::new(FileSlot::new(path)))?;

        Ok(Self {
            feedback: Feedback::new(loaded.config.feedback_duration()),
            config: loaded.config,
            store,
            notifier: notifier_from_env(),
            gate: ExtractionGate::new(),
        })
    }

    fn effective_config(&self, raw_overrides: &[String]) -> Result<Config, AppError> {
        let overrides = collect_config_overrides(raw_overrides).map_err(AppError::invalid_input)?;
        Ok(merge_overrides(&self.config, &overrides))
    }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    description: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Importance")]
    importance: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            description: task.description.clone(),
            time: task.time.to_string(),
            importance: task.importance.to_string(),
        }
    }
}

fn print_section(title: &str, tasks: &[Task], palette: &Palette) {
    println!("{}", palette.accentize(title));
    if tasks.is_empty() {
        println!("{}", palette.mutedize("None"));
        return;
    }

    let mut table = Table::new(tasks.iter().map(TaskRow::from));
    table.with(Style::sharp());
    println!("{table}");
}

fn print_ranked_plain(ranked: &RankedTasks, palette: &Palette) {
    if ranked.is_empty() {
        println!("{}", palette.mutedize("Empty schedule."));
        return;
    }

    print_section("Priority", &ranked.priority, palette);
    println!();
    print_section("Other tasks", &ranked.other, palette);
    if !ranked.completed.is_empty() {
        println!();
        print_section("Completed", &ranked.completed, palette);
    }
}

fn print_ranked_json(date: &str, ranked: &RankedTasks) {
    let json = serde_json::json!({
        "date": date,
        "priority": ranked.priority,
        "other": ranked.other,
        "completed": ranked.completed,
    });
    println!("{}", json);
}

fn print_task_json(task: &Task) {
    println!("{}", serde_json::json!(task));
}

fn print_task_plain(task: &Task) {
    let status = if task.completed { "completed" } else { "open" };
    println!("ID: {}", task.id);
    println!("Task: {}", task.description);
    println!("Time: {}", task.time);
    println!("Importance: {}", task.importance);
    println!("Status: {}", status);
}

fn print_history(history: &[DayRecord], json: bool) {
    if json {
        println!("{}", serde_json::json!(history));
    } else {
        print!("{}", format_history(history));
    }
}

fn describe(task: &Task) -> String {
    format!(
        "{} – {} [{}] ({})",
        task.description, task.time, task.importance, task.id
    )
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line.strip_prefix("error: ").unwrap_or(first_line);
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
        } else if in_quotes && ch == '\\' {
            escape = true;
        } else if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn confirm(prompt: &str, input: &mut dyn BufRead) -> Result<bool, AppError> {
    print!("{prompt} [y/N] ");
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|err| AppError::io(err.to_string()))?;

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn run_command(cli: Cli, session: &mut Session, input: &mut dyn BufRead) -> Result<(), AppError> {
    let config = session.effective_config(&cli.config_override)?;
    let palette = palette_for_theme(config.theme.as_deref());
    session.feedback.set_duration(config.feedback_duration());
    session.feedback.clear_expired(Instant::now());

    match cli.command {
        Command::Add { text } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                return Err(AppError::invalid_input("text is required"));
            }

            match classify_input(&text) {
                InputIntent::ShowHistory => print_history(session.store.history(), cli.json),
                InputIntent::Extract(text) => {
                    let extractor = extractor_from_env(&config);
                    if !cli.json {
                        eprintln!("{}", palette.mutedize("Organizing..."));
                    }
                    let drafts = session.gate.run(extractor.as_ref(), text)?;
                    let added = session.store.add_drafts(drafts)?;

                    if cli.json {
                        println!("{}", serde_json::json!(added));
                    } else if added.is_empty() {
                        println!("No tasks extracted.");
                    } else {
                        for task in &added {
                            println!("Added task: {}", describe(task));
                        }
                    }
                }
            }
        }
        Command::New {
            description,
            time,
            importance,
        } => {
            let task = session.store.add_task(DraftTask {
                description,
                time: time.as_deref().map(TaskTime::parse).unwrap_or_default(),
                importance: importance.map(Into::into).unwrap_or_default(),
            })?;
            if cli.json {
                print_task_json(&task);
            } else {
                println!("Added task: {}", describe(&task));
            }
        }
        Command::List => {
            let ranked = session.store.ranked();
            if cli.json {
                print_ranked_json(&session.store.today()?, &ranked);
            } else {
                if let Some(message) = session.feedback.current(Instant::now()) {
                    println!("{}", palette.accentize(message));
                }
                print_ranked_plain(&ranked, &palette);
            }
        }
        Command::Toggle { id } => {
            let task = session.store.toggle(&id)?;
            let message = if task.completed {
                let message = pick_message();
                session.feedback.show(message, Instant::now());
                deliver(
                    session.notifier.as_ref(),
                    message,
                    config.feedback_duration(),
                );
                Some(message)
            } else {
                None
            };

            if cli.json {
                print_task_json(&task);
            } else if let Some(message) = message {
                println!("Completed task: {} ({})", task.description, task.id);
                println!("{}", palette.accentize(message));
            } else {
                println!("Reopened task: {} ({})", task.description, task.id);
            }
        }
        Command::Edit {
            id,
            description,
            time,
            importance,
        } => {
            let update = TaskUpdate {
                description,
                time: time.as_deref().map(TaskTime::parse),
                importance: importance.map(Into::into),
            };
            let task = session.store.update(&id, update)?;
            if cli.json {
                print_task_json(&task);
            } else {
                println!("Updated task: {}", describe(&task));
            }
        }
        Command::Delete { id } => {
            let task = session.store.delete(&id)?;
            if cli.json {
                print_task_json(&task);
            } else {
                println!("Deleted task: {} ({})", task.description, task.id);
            }
        }
        Command::Show { id } => {
            let task = session.store.get(&id)?;
            if cli.json {
                print_task_json(&task);
            } else {
                print_task_plain(&task);
            }
        }
        Command::Clear { yes } => {
            if !yes && !confirm("Clear today's schedule?", input)? {
                println!("Clear cancelled.");
                return Ok(());
            }

            let removed = session.store.clear()?;
            if cli.json {
                println!("{}", serde_json::json!({ "cleared": removed }));
            } else {
                println!("Cleared {removed} task(s).");
            }
        }
        Command::History => print_history(session.store.history(), cli.json),
    }

    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut line = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        line.clear();
        let bytes = stdin_lock
            .read_line(&mut line)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        if trimmed == "help" || trimmed == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(trimmed) {
            Ok(args) if !args.is_empty() => args,
            Ok(_) => continue,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("teachertask".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, session, &mut stdin_lock) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV_VAR, "warn"))
        .format_timestamp(None)
        .init();
}

fn fail(err: AppError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(1);
}

fn main() {
    init_logging();

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        let mut session = Session::open().unwrap_or_else(|err| fail(err));
        if let Err(err) = run_interactive(&mut session) {
            fail(err);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version land here.
            let _ = err.print();
            return;
        }
        Err(err) => fail(normalize_parse_error(err)),
    };

    let mut session = Session::open().unwrap_or_else(|err| fail(err));
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    if let Err(err) = run_command(cli, &mut session, &mut stdin_lock) {
        fail(err);
    }
}
