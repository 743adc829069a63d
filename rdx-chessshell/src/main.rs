use anyhow::Result;
use chessclock::prelude::*;
use chessclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use colored::Colorize;
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod settings;
use settings::ShellSettings;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct MyHighlighter;

impl Highlighter for MyHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            let colored_command = command.yellow().bold();
            let colored_rest = rest.yellow();
            Cow::Owned(format!("{} {}", colored_command, colored_rest))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    const LOGO_TEXT: &str = include_str!("../logo.log");
    println!("{}", LOGO_TEXT.cyan());

    let version_string = format!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );

    println!("{}", "-------------------------------------------------------".dimmed());
    println!("{}", version_string);
    println!("{}", "-------------------------------------------------------".dimmed());
}

/// `mm:ss` rendering for the shell only; the engine hands out raw seconds.
fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn parse_player(arg: Option<&&str>) -> Option<Player> {
    match arg.copied() {
        Some("white") | Some("w") => Some(Player::White),
        Some("black") | Some("b") => Some(Player::Black),
        _ => None,
    }
}

/// Spawns several tasks, each subscribing to a different event stream from the engine.
fn spawn_event_listeners(engine: &ClockEngine, is_watching_state: Arc<AtomicBool>) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            println!("\n<-- [SYSTEM EVENT] {:?}\n>> ", event);
        }
    });

    let mut timeout_rx = engine.subscribe_timeouts();
    tokio::spawn(async move {
        while let Ok(event) = timeout_rx.recv().await {
            let message = format!("\n<-- [FLAG] {} is out of time!\n>> ", event.player);
            println!("{}", message.red().bold());
        }
    });

    // State listener (controlled by the shared flag).
    let mut state_rx = engine.subscribe_state_changes();
    tokio::spawn(async move {
        while let Ok(state) = state_rx.recv().await {
            if is_watching_state.load(Ordering::Relaxed) {
                println!(
                    "<-- [STATE] white {} | black {} | active: {:?}",
                    format_clock(state.white.time_remaining),
                    format_clock(state.black.time_remaining),
                    state.active_player
                );
            }
        }
    });
}

async fn print_status(engine: &ClockEngine) {
    let state = engine.snapshot().await;
    for player in [Player::White, Player::Black] {
        let info = engine.display_info(player).await;
        let marker = if state.active_player == Some(player) {
            "*"
        } else {
            " "
        };
        let mut line = format!(
            "{} {:5}  {}  moves: {}",
            marker,
            player.to_string(),
            format_clock(info.main_time),
            state.clock(player).move_count
        );
        if let Some(delay) = info.delay_time {
            line.push_str(&format!("  delay: {}s", delay));
        }
        if let Some(increment) = info.pending_increment {
            line.push_str(&format!("  inc: +{}s", increment));
        }
        if let Some(stage_info) = &info.stage_info {
            line.push_str(&format!("  [{}]", stage_info));
        }
        println!("{}", line);
    }
    let running = if state.is_running {
        "running".green()
    } else {
        "stopped".red()
    };
    println!("  clock is {} ({:?})", running, state.config.mode);
}

fn parse_new_command(args: &[&str]) -> Option<ClockConfig> {
    let secs = |index: usize| args.get(index).and_then(|raw| raw.parse::<u64>().ok());
    match *args.first()? {
        "sudden" => Some(ClockConfig::sudden_death(secs(1)? * 1000)),
        "delay" => Some(ClockConfig::simple_delay(secs(1)? * 1000, secs(2)? * 1000)),
        "bronstein" => Some(ClockConfig::bronstein(secs(1)? * 1000, secs(2)? * 1000)),
        "fischer" => Some(ClockConfig::fischer(secs(1)? * 1000, secs(2)? * 1000)),
        "multi" => {
            let stage = StageConfig {
                after_moves: args.get(3)?.parse().ok()?,
                add_millis: secs(4)? * 1000,
                inc_millis: None,
            };
            Some(ClockConfig::multi_stage(
                secs(1)? * 1000,
                Some(secs(2)? * 1000),
                vec![stage],
            ))
        }
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .init();

    let settings = ShellSettings::load()?;
    let config = settings.to_clock_config()?;
    let engine = ClockEngine::new(config)?;

    // Create the shared flag for the state listener.
    let is_watching_state = Arc::new(AtomicBool::new(false));
    spawn_event_listeners(&engine, is_watching_state.clone());

    let mut rl = Editor::new()?;
    let helper = MyHighlighter {};
    rl.set_helper(Some(helper));

    println!(
        "{} is ready. Type 'help' for commands or 'exit' to quit.",
        ENGINE_NAME.cyan()
    );

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let args = line.trim().split_whitespace().collect::<Vec<_>>();

                if let Some(command) = args.first() {
                    match *command {
                        "new" => match parse_new_command(&args[1..]) {
                            Some(config) => match engine.reset(Some(config)).await {
                                Ok(()) => println!("--> New clock ready."),
                                Err(error) => println!("Error: {}", error),
                            },
                            None => {
                                println!("Usage: new sudden <BASE_S>");
                                println!("       new delay <BASE_S> <DELAY_S>");
                                println!("       new bronstein <BASE_S> <DELAY_S>");
                                println!("       new fischer <BASE_S> <INC_S>");
                                println!("       new multi <BASE_S> <INC_S> <AFTER_MOVES> <ADD_S>");
                            }
                        },
                        "start" => {
                            let player = parse_player(args.get(1)).unwrap_or(Player::White);
                            engine.start(player).await;
                            println!("--> Clock started for {}.", player);
                        }
                        "press" => {
                            engine.switch_player().await;
                        }
                        "pause" => {
                            engine.pause().await;
                        }
                        "resume" => {
                            // The engine refuses to guess an opening side.
                            if engine.snapshot().await.active_player.is_none() {
                                println!("No move in progress yet. Use 'start [white|black]'.");
                            } else {
                                engine.resume().await;
                            }
                        }
                        "add" => match (parse_player(args.get(1)), args.get(2)) {
                            (Some(player), Some(raw)) if raw.parse::<i64>().is_ok() => {
                                engine.add_time(player, raw.parse().unwrap()).await;
                            }
                            _ => println!("Usage: add <white|black> <SECONDS>"),
                        },
                        "set" => match (parse_player(args.get(1)), args.get(2)) {
                            (Some(player), Some(raw)) if raw.parse::<u64>().is_ok() => {
                                engine.set_time(player, raw.parse().unwrap()).await;
                            }
                            _ => println!("Usage: set <white|black> <SECONDS>"),
                        },
                        "status" => print_status(&engine).await,
                        "info" => match parse_player(args.get(1)) {
                            Some(player) => {
                                println!("{:#?}", engine.display_info(player).await);
                            }
                            None => println!("Usage: info <white|black>"),
                        },
                        "watch" => {
                            let watching = !is_watching_state.load(Ordering::Relaxed);
                            is_watching_state.store(watching, Ordering::Relaxed);
                            if watching {
                                println!("--> Started printing the state stream.");
                            } else {
                                println!("--> Stopped printing the state stream.");
                            }
                        }
                        "reset" => match engine.reset(None).await {
                            Ok(()) => println!("--> Clock reset."),
                            Err(error) => println!("Error: {}", error),
                        },
                        "help" => {
                            println!("Available commands:");
                            println!("  new <MODE> <ARGS..>     - Replaces the clock (see 'new' for usage).");
                            println!("  start [white|black]     - Starts the clock (default white).");
                            println!("  press                   - Completes the active player's move.");
                            println!("  pause / resume          - Stops and continues the current move.");
                            println!("  add <SIDE> <S>          - Adds (or removes) seconds on one clock.");
                            println!("  set <SIDE> <S>          - Sets one clock outright.");
                            println!("  status                  - Shows both clocks.");
                            println!("  info <SIDE>             - Shows one side's display projection.");
                            println!("  watch                   - Toggles printing of the state stream.");
                            println!("  reset                   - Rebuilds from the current config.");
                            println!("  exit                    - Quits the shell.");
                        }
                        "exit" => break,
                        "" => {}
                        _ => println!("Unknown command: '{}'. Type 'help'.", line),
                    }
                }
            }
            Err(_) => {
                println!("Exiting chessshell...");
                break;
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}
