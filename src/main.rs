use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use clap::{command, Parser, ValueHint};
use log::{debug, error, info, warn, LevelFilter};

use spotify_lyrics::{
    config::{Config, SecretRefresh},
    lyrics::Client,
    sp_dc::SpDc,
    track::TrackId,
};

/// Profile to display when not built in release mode.
#[cfg(debug_assertions)]
const BUILD_PROFILE: &str = "debug";
/// Profile to display when not built release mode.
#[cfg(not(debug_assertions))]
const BUILD_PROFILE: &str = "release";

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Command line arguments as parsed by `clap`.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tracks to fetch lyrics for
    ///
    /// Each track can be a track ID, an open.spotify.com track URL or a
    /// spotify:track: URI.
    #[arg(required = true, value_name = "TRACK")]
    tracks: Vec<String>,

    /// Secrets file
    ///
    /// Ensure that this file is kept secure and not shared publicly, as it
    /// contains your sp_dc cookie which grants access to your Spotify account.
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath, default_value_t = String::from("secrets.toml"))]
    secrets_file: String,

    /// sp_dc cookie
    ///
    /// Takes precedence over the secrets file.
    #[arg(long, env = "SP_DC", hide_env_values = true)]
    sp_dc: Option<SpDc>,

    /// Directory to write `<track id>.json` files to
    #[arg(short, long, value_name = "DIR", value_hint = ValueHint::DirPath, default_value = ".")]
    output_dir: PathBuf,

    /// When to refetch the TOTP secret
    #[arg(long, value_enum, default_value_t = SecretRefresh::EveryDerivation)]
    secret_refresh: SecretRefresh,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,
}

/// Initializes the logger facade.
///
/// The logging level is determined as follows, in order of precedence from
/// highest to lowest:
/// 1. Command line arguments
/// 2. `RUST_LOG` environment variable
/// 3. Hard coded default
///
/// # Panics
///
/// Panics when a logger facade is already initialized.
fn init_logger(config: &Args) {
    let mut logger = env_logger::Builder::from_env(
        // Note: if you change the default logging level here, then you should
        // probably also change the verbosity levels below.
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if config.quiet || config.verbose > 0 {
        let level = match config.verbose {
            0 => {
                // Quiet and verbose are mutually exclusive, and `verbose` is 0
                // by default. So this arm means: quiet mode.
                LevelFilter::Warn
            }
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        // Filter log messages of external crates.
        logger.filter_module("spotify_lyrics", level);
    }

    logger.init();
}

/// Loads the `sp_dc` from the command line or the secrets file.
///
/// # Errors
///
/// Returns an error if no value was given on the command line and the
/// secrets file cannot be read or holds an invalid value.
fn load_sp_dc(args: &Args) -> spotify_lyrics::Result<SpDc> {
    if let Some(sp_dc) = &args.sp_dc {
        return Ok(sp_dc.clone());
    }

    let sp_dc = SpDc::from_file(&args.secrets_file);
    if sp_dc.is_err() {
        info!(
            "set sp_dc in {} or pass it with --sp-dc",
            args.secrets_file
        );
    }

    sp_dc
}

/// Fetches the lyrics of one track and writes them to the output directory.
async fn fetch_one(client: &Client, track: &str, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let track_id: TrackId = track.parse()?;
    let lyrics = client.lyrics_from_id(&track_id).await?;

    let path = output_dir.join(format!("{track_id}.json"));
    fs::write(&path, serde_json::to_string_pretty(&lyrics)?)?;

    info!(
        "wrote {} lines of lyrics to {}",
        lyrics.lyrics().lines.len(),
        path.display()
    );
    Ok(())
}

/// Main application loop.
///
/// Every track is fetched independently: a failure is logged and the next
/// track is tried.
///
/// # Returns
///
/// - `Ok(true)`: all tracks were written.
/// - `Ok(false)`: at least one track failed.
/// - `Err`: the client could not be set up.
async fn run(args: Args) -> Result<bool, Box<dyn Error>> {
    let sp_dc = load_sp_dc(&args)?;

    let mut config = Config::with_sp_dc(sp_dc)?;
    config.secret_refresh = args.secret_refresh;
    config.timeout = args.timeout.map(Duration::from_secs);

    fs::create_dir_all(&args.output_dir)?;
    let client = Client::new(&config)?;

    let mut failures = 0;
    for track in &args.tracks {
        if let Err(e) = fetch_one(&client, track, &args.output_dir).await {
            error!("{track}: {e}");
            failures += 1;
        }
    }

    if failures > 0 {
        warn!("{failures} of {} tracks failed", args.tracks.len());
    }

    Ok(failures == 0)
}

/// Main entry point of the application.
///
/// This function initializes the logger facade, parses the command line
/// arguments, and fetches the requested lyrics.
#[tokio::main]
async fn main() {
    // `clap` handles our command line arguments and help text.
    let args = Args::parse();
    init_logger(&args);

    // Dump command line arguments before we do anything more.
    // This aids in debugging of whatever comes next.
    debug!("Command {:#?}", args);

    let cmd = command!();
    let name = cmd.get_name().to_string();
    let version = cmd.get_version().unwrap_or("UNKNOWN").to_string();

    info!("starting {name}/{version}; {BUILD_PROFILE}");

    match run(args).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
