// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lifetrail - replay a life's journey as an animated trajectory
//!
//! A headless front end over the playback engine:
//! - Loads the event list and coordinate table
//! - Restores persisted viewer settings
//! - Drives autoplay on a virtual or real-time clock
//! - Prints frames, location details, statistics and exported records
//!
//! ## Architecture
//!
//! All playback state lives in [`lifetrail_playback::ReplaySession`]. This
//! binary only feeds it input files and clock ticks and renders what
//! [`lifetrail_playback::ReplaySession::frame`] returns.

mod driver;
mod error;
mod loader;
mod render;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use driver::Pacing;
use error::{AppError, Result};
use lifetrail_playback::{
    Frame, PlaySpeed, ReplaySession, SeekRejection, SessionError, SpeedPreset,
};
use settings::{ViewerSettings, SETTINGS_FILE_NAME};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "lifetrail")]
#[command(about = "Replay geo-located life events as an animated trajectory", version)]
struct Cli {
    /// Event list JSON file
    #[arg(long, default_value = "data/events.json")]
    events: PathBuf,

    /// Coordinate table JSON file
    #[arg(long, default_value = "data/regions.json")]
    regions: PathBuf,

    /// Viewer settings file
    #[arg(long, default_value = SETTINGS_FILE_NAME)]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Autoplay from an event to the end, printing each step
    Play {
        /// Event to start from
        #[arg(long, default_value = "0")]
        from: usize,
        /// Autoplay interval, overriding the saved setting
        #[arg(long)]
        speed: Option<PlaySpeedArg>,
        /// Pace the clock against wall time
        #[arg(long)]
        realtime: bool,
        /// Largest clock step in milliseconds
        #[arg(long, default_value = "16")]
        tick: u64,
        /// Print frames as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the frame for one event
    Show {
        /// Event index
        index: usize,
        /// Emphasize the event's path and refocus on it
        #[arg(long)]
        highlight: bool,
        /// List location markers
        #[arg(long)]
        markers: bool,
        /// Print the frame as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show visits at the place where an event ends
    Location {
        /// Event index
        index: usize,
    },

    /// Print whole-trajectory statistics
    Stats,

    /// Export an event's source record as JSON
    Export {
        /// Event index
        index: usize,
    },

    /// Update and save viewer settings
    Settings {
        /// Path animation duration in milliseconds
        #[arg(long)]
        path_duration: Option<u64>,
        /// Camera speed when fitting regions
        #[arg(long)]
        follow: Option<SpeedArg>,
        /// Camera speed when panning to a point
        #[arg(long)]
        pan: Option<SpeedArg>,
        /// Autoplay interval
        #[arg(long)]
        play_speed: Option<PlaySpeedArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SpeedArg {
    Slow,
    Normal,
    Fast,
    Instant,
}

impl From<SpeedArg> for SpeedPreset {
    fn from(arg: SpeedArg) -> Self {
        match arg {
            SpeedArg::Slow => SpeedPreset::Slow,
            SpeedArg::Normal => SpeedPreset::Normal,
            SpeedArg::Fast => SpeedPreset::Fast,
            SpeedArg::Instant => SpeedPreset::Instant,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlaySpeedArg {
    Slow,
    Normal,
    Fast,
    VeryFast,
}

impl From<PlaySpeedArg> for PlaySpeed {
    fn from(arg: PlaySpeedArg) -> Self {
        match arg {
            PlaySpeedArg::Slow => PlaySpeed::Slow,
            PlaySpeedArg::Normal => PlaySpeed::Normal,
            PlaySpeedArg::Fast => PlaySpeed::Fast,
            PlaySpeedArg::VeryFast => PlaySpeed::VeryFast,
        }
    }
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lifetrail=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Lifetrail v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = ViewerSettings::load_or_default(&cli.settings)?;

    if let Commands::Settings { path_duration, follow, pan, play_speed } = cli.command {
        if let Some(duration) = path_duration {
            settings.animation.set_path_duration(duration);
        }
        if let Some(follow) = follow {
            settings.camera.follow = follow.into();
        }
        if let Some(pan) = pan {
            settings.camera.pan = pan.into();
        }
        if let Some(speed) = play_speed {
            settings.play_speed = speed.into();
        }
        settings.save(&cli.settings)?;
        tracing::info!("Saved settings to {}", cli.settings.display());
        println!("{}", describe_settings(&settings));
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(AppError::Runtime)?;

    let trajectory = runtime.block_on(loader::load_trajectory(
        &cli.events,
        &cli.regions,
        settings.resolver.clone(),
    ))?;

    let mut session = ReplaySession::new(settings.animation.clone(), settings.camera);
    session.set_play_speed(settings.play_speed);
    session.load(trajectory);

    match cli.command {
        Commands::Play { from, speed, realtime, tick, json } => {
            jump(&mut session, from)?;
            if let Some(speed) = speed {
                session.set_play_speed(speed.into());
            }
            let pacing = Pacing { tick_ms: tick, realtime };
            let mut failure = None;
            runtime.block_on(driver::autoplay(&mut session, pacing, |frame| {
                if let Err(e) = print_frame(frame, json) {
                    failure.get_or_insert(e);
                }
            }));
            if let Some(e) = failure {
                return Err(e);
            }
        }
        Commands::Show { index, highlight, markers, json } => {
            jump(&mut session, index)?;
            if highlight {
                let outcome = session.highlight(index, true);
                tracing::debug!("Highlight request: {outcome:?}");
            }
            let frame = session.frame();
            print_frame(&frame, json)?;
            if markers && !json {
                print!("{}", render::markers(&frame));
            }
        }
        Commands::Location { index } => {
            jump(&mut session, index)?;
            let detail = session
                .current_event()
                .and_then(|event| event.end_coords)
                .and_then(|coords| session.location_detail(&coords.key()));
            match detail {
                Some(detail) => print!("{}", render::location_detail(&detail)),
                None => println!("Event {index} has no resolved location"),
            }
        }
        Commands::Stats => print!("{}", render::statistics(&session.statistics()?)),
        Commands::Export { index } => println!("{}", session.export_event(index)?),
        Commands::Settings { .. } => {}
    }

    Ok(())
}

fn jump(session: &mut ReplaySession, index: usize) -> Result<()> {
    match session.seek(index, false, true) {
        Ok(_) => Ok(()),
        Err(SeekRejection::OutOfRange) => Err(SessionError::IndexOutOfRange {
            index,
            len: session.events().len(),
        }
        .into()),
        Err(SeekRejection::NotReady | SeekRejection::AnimationInProgress) => {
            Err(SessionError::NotReady.into())
        }
    }
}

fn print_frame(frame: &Frame, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(frame)?);
    } else {
        println!("{}", render::frame_summary(frame));
    }
    Ok(())
}

fn describe_settings(settings: &ViewerSettings) -> String {
    format!(
        "path duration {} ms, camera follow {} / pan {}, autoplay every {} ms",
        settings.animation.path_duration_ms,
        settings.camera.follow.display_name(),
        settings.camera.pan.display_name(),
        settings.play_speed.interval_ms()
    )
}

