//! MIV AutoML CLI Module
//!
//! Interactive launcher for the three wizard stages.

mod terminal;

pub use terminal::TerminalSurface;

use clap::Parser;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use tracing::info;

use crate::error::MivError;
use crate::session::SessionState;
use crate::stages::{NavigationController, StageContext, WizardConfig};
use crate::training::AutoSearchEngine;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn wait_enter() {
    println!();
    println!("  {}", dim("press enter to continue"));
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
}

fn wizard_theme() -> ColorfulTheme {
    ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(245),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "miv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Guided AutoML wizard: load a table, search models, review results")]
#[command(long_about = None)]
pub struct Cli {}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("       {}", "┏┳┓╻╻ ╻".truecolor(120, 170, 255));
    println!("       {}", "┃┃┃┃┃┏┛".truecolor(100, 150, 240));
    println!("       {}", "╹ ╹╹┗┛ ".truecolor(80, 130, 220));
    println!();
    println!("       {}", dim(&format!("AutoML Wizard  ·  v{}  ·  rust", env!("CARGO_PKG_VERSION"))));
    println!();
}

fn print_session(session: &SessionState) {
    let dataset = session
        .dataset()
        .map(|d| format!("{} rows × {} cols", d.n_rows(), d.n_cols()))
        .unwrap_or_else(|| "none".to_string());
    let target = session.target_column().unwrap_or("none");
    let model = session.model().map(|m| m.name()).unwrap_or("none");

    println!("  {}   {}   {}", kv("data", &dataset), kv("target", target), kv("model", model));
}

/// Run the "Navigation Panel" loop until the user exits
pub fn run_interactive(config: WizardConfig) -> anyhow::Result<()> {
    print_banner();

    let theme = wizard_theme();
    let engine = AutoSearchEngine::new(config.search.clone());
    let nav = NavigationController::new();
    let mut session = SessionState::new();
    let mut surface = TerminalSurface::new();

    let mut items: Vec<String> = nav
        .stages()
        .iter()
        .map(|s| s.heading())
        .collect();
    items.push("Exit".to_string());

    let mut current = 0;
    loop {
        section("Navigation Panel");
        print_session(&session);
        println!();

        let sel = Select::with_theme(&theme)
            .with_prompt("Select Action:")
            .items(&items)
            .default(current)
            .interact_opt()?;

        let stage = match sel {
            Some(idx) if idx < nav.stages().len() => nav.stages()[idx],
            _ => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
        };
        current = nav.stages().iter().position(|s| *s == stage).unwrap_or(0);

        let mut ctx = StageContext {
            session: &mut session,
            surface: &mut surface,
            engine: &engine,
            config: &config,
        };
        match nav.dispatch(stage, &mut ctx) {
            Ok(()) => {}
            // Esc or ctrl-c inside a stage prompt returns to the panel
            Err(MivError::Prompt(reason)) => {
                info!(stage = %stage, reason = %reason, "Stage prompt abandoned");
            }
            Err(e) => return Err(e.into()),
        }
        wait_enter();
    }

    Ok(())
}
