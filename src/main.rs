use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::{fs, process};

use anyhow::{Context, Result};
use log::{info, warn};

use breathflow::audio::{SilentTones, ToneEngineHandle};
use breathflow::session::{BreathingController, ToneOutput};
use breathflow::settings::SettingsStore;
use breathflow::ui::{self, App, TerminalPresenter, VisualState};

fn main() {
    // Reads RUST_LOG; logs go to stderr so they stay out of the TUI.
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("breathflow");
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;
    let settings = Arc::new(SettingsStore::new(config_dir.join("settings.json"))?);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let tone_settings = settings.tone();
    let engine = tone_settings
        .enabled
        .then(|| Arc::new(ToneEngineHandle::new(tone_settings.level)));
    let tones: Arc<dyn ToneOutput> = match engine.clone() {
        Some(engine) => engine,
        None => {
            info!("tones disabled in settings; running visual-only");
            Arc::new(SilentTones)
        }
    };

    let visual = Arc::new(Mutex::new(VisualState::new()));
    let presenter = Arc::new(TerminalPresenter::new(Arc::clone(&visual)));
    let controller = BreathingController::new(presenter, tones);

    if let Err(err) = runtime.block_on(controller.set_pattern(settings.pattern())) {
        warn!("stored pattern rejected ({err:#}); keeping the default");
    }

    let app = App::new(controller.clone(), visual, settings, runtime.handle().clone());
    let result = ui::run(app);

    // App::quit stops the session on the normal path; an error path out of
    // the UI loop may not have.
    let _ = runtime.block_on(controller.stop());
    if let Some(engine) = engine {
        engine.shutdown();
    }

    result
}
