//! # Labkit - Interactive Lab Windows
//!
//! Desktop front end for the lab exercises. Each subcommand opens one window:
//!
//! - `dashboard`: vegetation indices filtered by region, week and year
//! - `signal`: a noisy harmonic and its zero-phase low-pass filtered copy
//! - `regression`: prints both line fits, then plots them over the sample
//!
//! ## Architecture
//! - **State**: one [`Session`] per window, owned by [`LabApp`]
//! - **Updates**: every widget callback becomes [`Message::Control`] (or
//!   [`Message::Reset`]) and goes through [`Session::apply`]
//! - **Rendering**: the latest frame lives in a [`Snapshot`]; views read it

mod ui;
mod widgets;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use iced::{Size, Task, Theme};
use labkit_core::config::{DashboardConfig, LabConfig, RegressionConfig, SignalConfig};
use labkit_core::dashboard::{DashboardDerivation, dashboard_store};
use labkit_core::regression::RegressionReport;
use labkit_core::signal::{FilterDisplay, SignalDerivation, TimeAxis, signal_store};
use labkit_core::vegetation::VegetationTable;
use labkit_core::{ControlEvent, Derivation, Session, Snapshot, Value};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "labkit", version, about = "Interactive parameter-to-visualization labs")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Vegetation-index dashboard over today's cleaned CSV
    Dashboard {
        /// CSV to load instead of discovering today's file
        #[arg(long)]
        source: Option<PathBuf>,

        /// Directory searched for cleaned_data_for_<date>_*.csv
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Harmonic with optional noise and a zero-phase low-pass filter
    Signal {
        /// Samples on the time axis
        #[arg(long)]
        samples: Option<usize>,

        /// Fixed noise seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Least-squares fit of a synthetic line
    Regression {
        #[arg(long, allow_negative_numbers = true)]
        slope: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        intercept: Option<f64>,

        #[arg(long)]
        points: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Print the report without opening a window
        #[arg(long)]
        no_plot: bool,
    },
}

/// Messages shared by all lab windows.
#[derive(Debug, Clone)]
pub enum Message {
    /// A control changed; carries the control name and its new value.
    Control(&'static str, Value),
    /// Restore every control to its default.
    Reset,
    SelectTab(Tab),
}

/// Dashboard view selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Table,
    Plot,
    Comparison,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Table, Tab::Plot, Tab::Comparison];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Table => "Table",
            Tab::Plot => "Plot",
            Tab::Comparison => "Comparison",
        }
    }
}

/// Window state: the session plus the last rendered frame.
pub struct LabApp<D: Derivation> {
    session: Session<D>,
    sink: Snapshot<D::Output>,
    tab: Tab,
    /// Text of the last rejected update, cleared by the next accepted one.
    notice: Option<String>,
}

impl<D> LabApp<D>
where
    D: Derivation,
    D::Output: Clone,
{
    /// Wraps `session` and renders its initial frame.
    fn new(session: Session<D>) -> Self {
        let mut sink = Snapshot::default();
        session.refresh(&mut sink);
        Self { session, sink, tab: Tab::Table, notice: None }
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::Control(name, value) => self.dispatch(ControlEvent::set(name, value)),
            Message::Reset => self.dispatch(ControlEvent::Reset),
            Message::SelectTab(tab) => self.tab = tab,
        }
    }

    fn dispatch(&mut self, event: ControlEvent) {
        self.notice = match self.session.apply(event, &mut self.sink) {
            Ok(()) => None,
            Err(e) => Some(e.to_string()),
        };
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn session(&self) -> &Session<D> {
        &self.session
    }

    pub fn sink(&self) -> &Snapshot<D::Output> {
        &self.sink
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

/// Read-only window for the regression plot.
pub struct RegressionWindow {
    report: RegressionReport,
}

impl RegressionWindow {
    pub fn report(&self) -> &RegressionReport {
        &self.report
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let mut config = LabConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Dashboard { source, data_dir } => {
            if source.is_some() {
                config.dashboard.source = source;
            }
            if let Some(dir) = data_dir {
                config.dashboard.data_dir = dir;
            }
            run_dashboard(&config.dashboard)
        }
        Command::Signal { samples, seed } => {
            config.signal.samples = samples.unwrap_or(config.signal.samples);
            config.signal.seed = seed.or(config.signal.seed);
            run_signal(&config.signal)
        }
        Command::Regression { slope, intercept, points, seed, no_plot } => {
            let cfg = &mut config.regression;
            cfg.slope = slope.unwrap_or(cfg.slope);
            cfg.intercept = intercept.unwrap_or(cfg.intercept);
            cfg.points = points.unwrap_or(cfg.points);
            cfg.seed = seed.unwrap_or(cfg.seed);
            run_regression(&config.regression, no_plot)
        }
    }
}

fn run_dashboard(config: &DashboardConfig) -> Result<()> {
    let path = config.resolve_source().context("No vegetation data to show")?;
    let table = VegetationTable::load(&path).context("Failed to load the vegetation table")?;
    let store = dashboard_store(&table)?;
    let app = LabApp::new(Session::new(DashboardDerivation::new(table), store));

    info!("Opening dashboard for {}", path.display());
    iced::application("Vegetation indices", LabApp::update, ui::dashboard::view)
        .theme(LabApp::theme)
        .window_size(Size::new(1280.0, 780.0))
        .run_with(move || (app, Task::none()))
        .map_err(|e| anyhow!("Dashboard window failed: {}", e))
}

fn run_signal(config: &SignalConfig) -> Result<()> {
    let axis = TimeAxis::new(config.samples).context("Invalid sample count")?;
    let derivation = match config.seed {
        Some(seed) => SignalDerivation::with_seed(axis, FilterDisplay::HideWhenDisabled, seed),
        None => SignalDerivation::new(axis, FilterDisplay::HideWhenDisabled),
    };
    let app = LabApp::new(Session::new(derivation, signal_store()?));

    info!("Opening signal demo with {} samples", config.samples);
    iced::application("Harmonic with noise and filter", LabApp::update, ui::signal::view)
        .theme(LabApp::theme)
        .window_size(Size::new(1280.0, 640.0))
        .run_with(move || (app, Task::none()))
        .map_err(|e| anyhow!("Signal window failed: {}", e))
}

fn run_regression(config: &RegressionConfig, no_plot: bool) -> Result<()> {
    let sample = config.sample().context("Invalid regression sample")?;
    let report = RegressionReport::compute(sample).context("Regression fit failed")?;
    println!("{}", report);
    if !report.agrees(config.tolerance) {
        warn!("Fits differ by more than {}", config.tolerance);
    }
    if no_plot {
        return Ok(());
    }

    let window = RegressionWindow { report };
    iced::application("Linear regression", |_: &mut RegressionWindow, _: Message| {}, ui::regression::view)
        .theme(|_| Theme::Dark)
        .window_size(Size::new(960.0, 640.0))
        .run_with(move || (window, Task::none()))
        .map_err(|e| anyhow!("Regression window failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use labkit_core::signal::controls;

    fn signal_app() -> LabApp<SignalDerivation> {
        let derivation = SignalDerivation::with_seed(TimeAxis::new(64).unwrap(), FilterDisplay::HideWhenDisabled, 1);
        LabApp::new(Session::new(derivation, signal_store().unwrap()))
    }

    #[test]
    fn test_controls_flow_through_the_session() {
        let mut app = signal_app();
        assert_eq!(app.sink().renders(), 1);

        app.update(Message::Control(controls::FILTER_ENABLED, Value::Toggle(true)));
        assert_eq!(app.sink().renders(), 2);
        assert!(app.sink().current().is_some_and(|f| f.filtered.is_some()));

        app.update(Message::Reset);
        assert!(app.sink().current().is_some_and(|f| f.filtered.is_none()));
    }

    #[test]
    fn test_rejected_update_sets_notice() {
        let mut app = signal_app();
        app.update(Message::Control(controls::AMPLITUDE, Value::Toggle(true)));
        assert!(app.notice().is_some());
        assert_eq!(app.sink().renders(), 1);

        app.update(Message::Control(controls::AMPLITUDE, Value::Float(2.0)));
        assert!(app.notice().is_none());
    }

    #[test]
    fn test_tab_selection_does_not_render() {
        let mut app = signal_app();
        app.update(Message::SelectTab(Tab::Plot));
        assert_eq!(app.tab(), Tab::Plot);
        assert_eq!(app.sink().renders(), 1);
    }

    #[test]
    fn test_cli_accepts_negative_slope() {
        let cli = Cli::try_parse_from(["labkit", "regression", "--slope", "-1.5", "--no-plot"]).unwrap();
        match cli.command {
            Command::Regression { slope, no_plot, .. } => {
                assert_eq!(slope, Some(-1.5));
                assert!(no_plot);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
