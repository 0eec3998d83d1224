//! Hel Process Manager
//!
//! A terminal process monitor: a sortable process table, rolling graphs for
//! CPU, memory, disk and network, a system and network overview, autostart
//! entries, and process controls (kill, suspend, nice, affinity, I/O
//! priority).
//!
//! Controls:
//! - 1-5 / Tab: Switch page
//! - q: Quit
//! - k: Kill selected process (with confirmation)
//! - p / u: Suspend / resume
//! - n / a / i: Nice value, CPU affinity, I/O priority
//! - s / l: Sort by next column / pin sort
//! - /: Filter by process name or pid
//! - [ / ]: Slow down / speed up refresh
//! - ?: Help

mod app;
mod config;
mod constants;
mod logging;
mod startup;
mod system;
mod ui;

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};

use app::{App, Args, DiskRates, KeyAction, NetRates, ViewMode};
use config::Settings;
use constants::{APP_NAME, APP_VERSION, DISPLAY_NAME};
use ui::render;

/// Processes listed by `--once`
const ONCE_TOP_PROCESSES: usize = 10;

fn main() -> Result<()> {
    let args = Args::parse();
    let (settings, warnings) = Settings::load(&args);

    if let Err(err) = logging::init(&settings.log_level, &settings.log_file) {
        eprintln!("{}: logging disabled: {:#}", APP_NAME, err);
    }
    info!("{} {} starting", APP_NAME, APP_VERSION);
    for warning in &warnings {
        warn!("{}", warning);
    }

    let mut app = App::native(&settings);

    if settings.once {
        return print_summary(&mut app, settings.interval);
    }

    let mut stdout = io::stdout();

    // Set up terminal
    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, DisableLineWrap, Hide)?;

    let result = run(&mut stdout, &mut app);

    // Restore terminal even when the loop failed
    execute!(stdout, Show, EnableLineWrap, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    info!("{} exiting", APP_NAME);
    result?;
    println!("{} closed.", DISPLAY_NAME);
    Ok(())
}

/// The interactive loop: render, wait for a key or the next tick, repeat.
fn run(stdout: &mut io::Stdout, app: &mut App) -> Result<()> {
    app.refresh();
    let mut last_refresh = Instant::now();

    loop {
        render(stdout, app)?;

        let refresh_interval = Duration::from_millis(app.refresh_interval_ms);
        let timeout = refresh_interval
            .checked_sub(last_refresh.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                // Only handle key PRESS events, ignore Release and Repeat
                if key_event.kind == KeyEventKind::Press
                    && app.handle_key(key_event.code, key_event.modifiers)? == KeyAction::Exit
                {
                    return Ok(());
                }
            }
        }

        // Time-based refresh (recalculate interval in case it changed)
        if last_refresh.elapsed() >= Duration::from_millis(app.refresh_interval_ms) {
            app.refresh();
            if app.view_mode == ViewMode::DetailView {
                app.refresh_detail_view();
            }
            last_refresh = Instant::now();
        }
    }
}

/// Takes two samples one interval apart so rates have a baseline, then
/// prints them with the busiest processes.
fn print_summary(app: &mut App, interval: Duration) -> Result<()> {
    app.refresh();
    thread::sleep(interval);
    app.refresh();

    println!("{}", app.status_line);
    if let Some(rates) = app.rates {
        match rates.net {
            NetRates::Available { upload_kbs, download_kbs } => println!(
                "Net: up {} | down {}",
                ui::format_kbs(upload_kbs),
                ui::format_kbs(download_kbs)
            ),
            NetRates::Unavailable => println!("Net: not available"),
        }
        match rates.disk {
            DiskRates::Available { read_kbs, write_kbs } => println!(
                "Disk I/O: read {} | write {}",
                ui::format_kbs(read_kbs),
                ui::format_kbs(write_kbs)
            ),
            DiskRates::Unavailable => println!("Disk I/O: not available"),
        }
    }

    let mut busiest = app.filtered_processes.clone();
    busiest.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    println!();
    println!("{:>7}  {:>6}  {:>6}  {:<19}  {}", "PID", "CPU%", "MEM%", "Started", "Name");
    for record in busiest.iter().take(ONCE_TOP_PROCESSES) {
        println!(
            "{:>7}  {:>6.1}  {:>6.1}  {:<19}  {}",
            record.pid,
            record.cpu_percent,
            record.mem_percent,
            record.start_time.display_with(|secs| ui::format_timestamp(*secs)),
            record.name
        );
    }
    Ok(())
}
