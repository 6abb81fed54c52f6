mod app;
mod input;
mod ui;
mod worker;

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use alicat_rtu::DeviceType;
use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::AppState;
use input::handle_key_event;
use ui::render_ui;
use worker::{spawn_worker, MonitorCommand, MonitorEvent, WorkerConfig};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Alicat instrument TUI monitor")]
struct Args {
    /// Serial port path (e.g. /dev/ttyUSB0)
    #[arg(short, long)]
    port: Option<String>,

    /// Serial baud rate
    #[arg(short, long, default_value_t = 19_200)]
    baud: u32,

    /// Modbus device address
    #[arg(short, long, default_value_t = 1)]
    address: u8,

    /// Instrument type on the other end of the line
    #[arg(short = 'd', long, value_enum)]
    device_type: DeviceType,

    /// Offset added to logical register addresses before they go on the
    /// wire
    #[arg(short = 'o', long, default_value_t = -1, allow_hyphen_values = true)]
    register_offset: i32,

    /// Poll interval in milliseconds
    #[arg(short = 'i', long, default_value_t = 500)]
    poll_interval: u64,

    /// Disable write commands
    #[arg(short = 'r', long, default_value_t = false)]
    read_only: bool,

    /// Forward adapter wire diagnostics to the diagnostics pane
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Poll a simulated instrument instead of a serial port
    #[cfg(debug_assertions)]
    #[arg(long, default_value_t = false)]
    simulate: bool,
}

#[derive(Debug, Clone)]
struct RuntimeArgs {
    worker: WorkerConfig,
    read_only: bool,
    simulate_ui: bool,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let runtime = resolve_runtime_args(&args)?;

    enable_raw_mode().wrap_err("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).wrap_err("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (command_tx, command_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();

    let worker_handle = spawn_worker(runtime.worker.clone(), command_rx, event_tx);

    let tick_rate = Duration::from_millis(100);
    let mut app = AppState::new(
        runtime.worker.device_type,
        runtime.simulate_ui,
        runtime.read_only,
    );
    let mut exit_error: Option<eyre::Report> = None;

    loop {
        terminal.draw(|frame| render_ui(frame, &app))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && handle_key_event(key.code, &mut app, &command_tx)?
        {
            break;
        }

        match event_rx.try_recv() {
            Ok(MonitorEvent::Telemetry(telemetry)) => app.update_telemetry(telemetry),
            Ok(MonitorEvent::Connection(connected)) => app.connected = connected,
            Ok(MonitorEvent::Diagnostic(message)) => app.push_diagnostic(message),
            Ok(MonitorEvent::Error(err)) => {
                exit_error = Some(err.wrap_err("instrument connection failed"));
                app.should_quit = true;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                exit_error = Some(eyre::eyre!("worker thread disconnected"));
                app.should_quit = true;
            }
        }

        if app.should_quit {
            break;
        }
    }

    command_tx.send(MonitorCommand::Terminate).ok();
    worker_handle.join().ok();

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Some(err) = exit_error {
        return Err(err);
    }

    Ok(())
}

fn resolve_runtime_args(args: &Args) -> eyre::Result<RuntimeArgs> {
    let simulate = simulate_requested(args);
    let port = if simulate {
        None
    } else {
        Some(args.port.clone().ok_or_else(|| {
            eyre::eyre!("serial port required unless running with --simulate")
        })?)
    };

    Ok(RuntimeArgs {
        worker: WorkerConfig {
            port,
            baud: args.baud,
            address: args.address,
            device_type: args.device_type,
            register_offset: args.register_offset,
            poll_interval: Duration::from_millis(args.poll_interval),
            read_only: args.read_only,
            verbose: args.verbose,
        },
        read_only: args.read_only,
        simulate_ui: simulate,
    })
}

#[cfg(debug_assertions)]
fn simulate_requested(args: &Args) -> bool {
    args.simulate
}

#[cfg(not(debug_assertions))]
fn simulate_requested(_args: &Args) -> bool {
    false
}
