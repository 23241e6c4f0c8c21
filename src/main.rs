use anyhow::{Context, Result};
use clap::Parser;
use hamdeck::{
    bus::{Reply, RequestKind, SignalBus},
    config::{get_app_config_path, get_app_data_path, Config, Section},
    launcher,
    platform::NativePlatform,
    window::MainWindow,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{collections::BTreeMap, io::Stdout, path::PathBuf, rc::Rc};

/// Coordination shell for an amateur-radio desktop messaging client.
#[derive(Parser)]
#[command(author)]
pub struct Args {
    /// Use an alternate config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Launch the repeater proxy and exit
    #[arg(long)]
    proxy: bool,
}

fn main() -> Result<()> {
    init_tracing()?;

    tracing::info!(
        "Started {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );

    let args = Args::parse();

    if args.proxy {
        launcher::launch_proxy();
        return Ok(());
    }

    let config_path = match args.config {
        Some(path) => path,
        None => get_app_config_path()?.join("config.toml"),
    };
    let config = Config::load(&config_path).context("Loading config")?;
    let data_dir = get_app_data_path()?;

    let bus = Rc::new(SignalBus::new());
    register_loopback_collaborators(&bus, &config)?;

    let mut terminal = setup_terminal()?;
    let mut window = MainWindow::new(
        config,
        config_path,
        data_dir,
        bus,
        Rc::new(NativePlatform),
    );
    window.set_status("Ready");

    let res = window.run(&mut terminal);

    restore_terminal(terminal)?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Stands in for the transport subsystem until one is attached: answers the
/// request-reply signals from config and traces outbound traffic.
fn register_loopback_collaborators(bus: &Rc<SignalBus>, config: &Config) -> Result<()> {
    let chat_port = config
        .get(Section::State, "chat_port")
        .unwrap_or("0")
        .to_string();
    bus.respond(RequestKind::ChatPort, move |_| {
        Reply::ChatPort(chat_port.clone())
    })?;
    bus.respond(RequestKind::StationList, |_| {
        Reply::StationList(BTreeMap::new())
    })?;

    bus.subscribe(|event| tracing::info!(%event, "outbound"));
    Ok(())
}

#[tracing::instrument(skip())]
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    tracing::debug!("Setting up terminal");

    let mut stdout = std::io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableFocusChange
    )?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

#[tracing::instrument(skip(terminal))]
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableFocusChange
    )?;
    terminal.show_cursor()?;

    tracing::debug!("Terminal restored");

    Ok(())
}

/// Initializes the `tracing` system for logging.
fn init_tracing() -> Result<()> {
    let log_env = format!("{}_LOGLEVEL", env!("CARGO_PKG_NAME").to_uppercase());
    let log_filename = format!("{}.log", env!("CARGO_PKG_NAME"));

    let log_file_path = if let Ok(dir) = get_app_data_path() {
        dir.join(log_filename)
    } else {
        PathBuf::from(".")
            .join(format!(".{}", env!("CARGO_PKG_NAME")))
            .join(log_filename)
    };

    let log_file = std::fs::File::create(log_file_path)?;

    // set up the logging level env var
    std::env::set_var(
        "RUST_LOG",
        std::env::var("RUST_LOG")
            .or_else(|_| std::env::var(log_env))
            .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME"))),
    );

    let subscriber = tracing_subscriber::fmt()
        .with_line_number(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(log_file)
        .pretty()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
