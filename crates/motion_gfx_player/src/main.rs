// SPDX-License-Identifier: MIT OR Apache-2.0
//! Motion GFX Player - headless preview of a Motion GFX scene
//!
//! Plays the demo scene against a simulated host timeline:
//! - Frame-stepped playback with speed and looping
//! - Scripted scrubbing (seek, reverse, pause)
//! - Duration changes forwarded to the host as graph rebuilds
//!
//! ## Usage
//!
//! ```text
//! motion_gfx_player [config.ron]
//! motion_gfx_player --init <path>
//! ```

mod config;
mod demo;
mod playback;
mod player;
mod timeline;

use config::{ConfigError, PlayerConfig, CONFIG_FILE_NAME};
use demo::{build_demo_scene, PropertyStore};
use motion_gfx_core::{Holder, Tick};
use player::Player;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// What the command line asked for
enum Action {
    Play(PathBuf),
    Init(PathBuf),
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Action, ConfigError> {
    match args.next().as_deref() {
        None => Ok(Action::Play(PathBuf::from(CONFIG_FILE_NAME))),
        Some("--init") => args
            .next()
            .map(|path| Action::Init(PathBuf::from(path)))
            .ok_or_else(|| ConfigError::Invalid("--init needs a path".to_string())),
        Some(path) => Ok(Action::Play(PathBuf::from(path))),
    }
}

fn run() -> Result<(), ConfigError> {
    match parse_args(std::env::args().skip(1))? {
        Action::Init(path) => {
            PlayerConfig::default().save(&path)?;
            tracing::info!("Wrote default config to {:?}", path);
        }
        Action::Play(path) => {
            let config = PlayerConfig::load_or_default(&path)?;
            let store = PropertyStore::new();
            let scene = build_demo_scene(&store);

            let mut player = Player::new(config, scene, store.clone());
            tracing::info!(
                scene = player.scene().name(),
                duration = player.scene().duration(),
                "Playing"
            );

            let reports = player.run();
            let restarts = reports
                .iter()
                .filter(|r| r.update.tick == Some(Tick::Restarted))
                .count();
            let timeline = player.timeline();
            tracing::info!(
                frames = reports.len(),
                restarts,
                state = ?player.controller().state,
                clip_duration = timeline.clip_duration(),
                clamped_duration = timeline.clamped_duration(),
                graph_rebuilds = timeline.graph_rebuilds(),
                title_opacity = ?store.get("title.opacity"),
                "Finished"
            );
        }
    }
    Ok(())
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("motion_gfx_player=debug,motion_gfx_core=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Motion GFX Player v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        tracing::error!("Player failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_args() {
        assert!(matches!(
            parse_args(args(&[])),
            Ok(Action::Play(path)) if path == PathBuf::from(CONFIG_FILE_NAME)
        ));
        assert!(matches!(
            parse_args(args(&["scrub.ron"])),
            Ok(Action::Play(path)) if path == PathBuf::from("scrub.ron")
        ));
        assert!(matches!(
            parse_args(args(&["--init", "out.ron"])),
            Ok(Action::Init(path)) if path == PathBuf::from("out.ron")
        ));
        assert!(matches!(
            parse_args(args(&["--init"])),
            Err(ConfigError::Invalid(_))
        ));
    }
}
