// mcap - headless capture settings driver
// Reads and edits the same preferences the capture app uses.

mod exit_codes;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use mediacapture_settings::{
    CaptureSettings, ChoiceGroup, EditorSession, Field, MediaCategory, SettingsError,
    StorageConfig,
};

use exit_codes::{settings_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "mcap")]
#[command(about = "Inspect and edit media-capture settings")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/mediacapture/mediacapture.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base data directory (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Debug logging (otherwise RUST_LOG, default warn)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print current settings and which options are editable
    Show {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one or more fields and save
    #[command(after_help = "\
Examples:
  mcap set video_capture_enabled=on
  mcap set AudioCaptureEnabled=true auto_record_next_movie=on max_movie_duration='5 Minutes'
  mcap set camera=back resolution=2")]
    Set {
        /// FIELD=VALUE edits, applied in order
        #[arg(required = true, value_name = "FIELD=VALUE")]
        edits: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore default settings
    Reset,

    /// Print (creating if needed) the storage directories
    Paths,

    /// Delete every recorded movie
    DeleteVideos,

    /// Delete every captured still image
    DeleteImages,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = load_config(&cli).and_then(|config| match cli.command {
        Commands::Show { json } => cmd_show(&config, json),
        Commands::Set { edits, json } => cmd_set(&config, &edits, json),
        Commands::Reset => cmd_reset(&config),
        Commands::Paths => cmd_paths(&config),
        Commands::DeleteVideos => cmd_delete(&config, MediaCategory::Video),
        Commands::DeleteImages => cmd_delete(&config, MediaCategory::Image),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        let hint = match &err {
            SettingsError::UnknownField(_) => Some(format!(
                "known fields: {}",
                Field::ALL.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
            )),
            SettingsError::InvalidValue { field, .. } => field
                .parse::<Field>()
                .ok()
                .and_then(Field::choice_group)
                .map(|g| format!("choose an index or one of: {}", g.options().join(", "))),
            _ => None,
        };
        Self { code: settings_exit_code(&err), message: err.to_string(), hint }
    }
}

fn load_config(cli: &Cli) -> Result<StorageConfig, CliError> {
    let path = cli.config.clone().unwrap_or_else(StorageConfig::default_path);
    let mut config = StorageConfig::load(&path)?;
    if let Some(base) = &cli.base_dir {
        config.base_dir = Some(base.clone());
    }
    Ok(config)
}

// ============================================================================
// show / set / reset
// ============================================================================

fn cmd_show(config: &StorageConfig, json: bool) -> Result<(), CliError> {
    let (mut store, _dirs) = config.open()?;
    let settings = store.load()?;
    print_settings(&settings, json)
}

fn cmd_set(config: &StorageConfig, edits: &[String], json: bool) -> Result<(), CliError> {
    let parsed = edits
        .iter()
        .map(|e| parse_edit(e))
        .collect::<Result<Vec<_>, _>>()?;

    let (mut store, _dirs) = config.open()?;
    let current = store.load()?;

    let mut session = EditorSession::begin(&current);
    for (field, raw) in parsed {
        let value = field.parse_value(&raw)?;
        session.set_field(field, value)?;
    }

    if !session.is_dirty() {
        log::info!("no changes");
        session.discard();
        return print_settings(&current, json);
    }

    let committed = session.commit();
    store.save(&committed)?;
    print_settings(&committed, json)
}

fn cmd_reset(config: &StorageConfig) -> Result<(), CliError> {
    let (mut store, _dirs) = config.open()?;
    store.load()?;
    store.save(&CaptureSettings::default())?;
    print_settings(store.settings(), false)
}

/// Split `field=value`
fn parse_edit(edit: &str) -> Result<(Field, String), CliError> {
    let (name, value) = edit.split_once('=').ok_or_else(|| {
        CliError::args(format!("expected FIELD=VALUE, got {:?}", edit))
            .with_hint("e.g. mcap set video_capture_enabled=on")
    })?;
    let field: Field = name.parse()?;
    Ok((field, value.to_string()))
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

fn render_text(settings: &CaptureSettings) -> String {
    let session = EditorSession::begin(settings);
    let choice = |group: ChoiceGroup| {
        let view = session.group(group);
        let label = group.options()[view.selected];
        if view.interactive {
            label.to_string()
        } else {
            format!("{} (disabled)", label)
        }
    };
    let looping = if session.is_interactive(Field::AutoRecordNextMovie) {
        on_off(settings.auto_record_next_movie).to_string()
    } else {
        format!("{} (disabled)", on_off(settings.auto_record_next_movie))
    };

    let mut out = String::new();
    out.push_str("Camera\n");
    out.push_str(&format!("  Source Camera:    {}\n", choice(ChoiceGroup::Camera)));
    out.push_str(&format!("  Resolution:       {}\n", choice(ChoiceGroup::Resolution)));
    out.push_str("Still Images\n");
    out.push_str(&format!("  Capture:          {}\n", on_off(settings.image_capture_enabled)));
    out.push_str(&format!("  Save To:          {}\n", choice(ChoiceGroup::ImageSaveMode)));
    out.push_str("Media\n");
    out.push_str(&format!("  Record Audio:     {}\n", on_off(settings.audio_capture_enabled)));
    out.push_str(&format!("  Record Video:     {}\n", on_off(settings.video_capture_enabled)));
    out.push_str(&format!("  Loop Recordings:  {}\n", looping));
    out.push_str(&format!("  Maximum Time:     {}\n", choice(ChoiceGroup::Duration)));
    out
}

fn render_json(settings: &CaptureSettings) -> serde_json::Value {
    let session = EditorSession::begin(settings);
    let groups: serde_json::Map<String, serde_json::Value> = ChoiceGroup::ALL
        .iter()
        .map(|g| {
            let view = session.group(*g);
            (
                g.field().name().to_string(),
                serde_json::json!({
                    "selected": view.selected,
                    "label": g.options()[view.selected],
                    "interactive": view.interactive,
                }),
            )
        })
        .collect();

    serde_json::json!({
        "settings": settings,
        "groups": groups,
        "auto_record_interactive": session.is_interactive(Field::AutoRecordNextMovie),
    })
}

fn print_settings(settings: &CaptureSettings, json: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let text = if json {
        serde_json::to_string_pretty(&render_json(settings))
            .map_err(|e| CliError::io(e.to_string()))?
            + "\n"
    } else {
        render_text(settings)
    };
    handle
        .write_all(text.as_bytes())
        .map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// paths / delete
// ============================================================================

fn cmd_paths(config: &StorageConfig) -> Result<(), CliError> {
    let (_store, dirs) = config.open()?;
    for category in MediaCategory::ALL {
        let path = dirs.directory(category)?;
        println!("{:<10} {}", category.dir_name(), path.display());
    }
    Ok(())
}

fn cmd_delete(config: &StorageConfig, category: MediaCategory) -> Result<(), CliError> {
    let (mut store, mut dirs) = config.open()?;
    let session = EditorSession::begin(&store.load()?);
    let result = match category {
        MediaCategory::Video => session.delete_all_videos(&mut dirs),
        MediaCategory::Image => session.delete_all_images(&mut dirs),
        MediaCategory::Config => {
            return Err(CliError::args("refusing to delete the Config directory"));
        }
    };
    session.discard();
    result?;
    println!("deleted {}", dirs.path_for(category).display());
    Ok(())
}
