//! The `convert` subcommand: drive a conversion to completion, prompting on
//! permission gates where the app would show a dialog, then print (and
//! optionally export) the result.

use std::io::Write as _;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, ValueEnum};
use geolink_core::config::load_app_config;
use geolink_core::{gpx, Permission, Position};
use geolink_engine::{
    Automation, BillingStatus, ConversionState, Engine, InMemoryPreferences, PreferenceStore,
    StaticBilling,
};
use geolink_net::{UrlClient, UrlClientConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Geo,
    Google,
    Apple,
    Magicearth,
    Coords,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Link, geo: URI, or free-form text containing one.
    pub input: String,

    /// Output serialization.
    #[arg(long, value_enum, default_value_t = OutputFormat::Geo)]
    pub format: OutputFormat,

    /// Also write the result as GPX 1.1 to this path.
    #[arg(long)]
    pub gpx: Option<std::path::PathBuf>,

    /// Standing network permission for this run (overrides the
    /// GEOLINK_CONNECTION_PERMISSION environment value).
    #[arg(long)]
    pub permission: Option<String>,
}

pub fn render(position: &Position, format: OutputFormat) -> String {
    match format {
        OutputFormat::Geo => position.to_geo_uri(),
        OutputFormat::Google => position.to_google_maps_url(),
        OutputFormat::Apple => position.to_apple_maps_url(),
        OutputFormat::Magicearth => position.to_magic_earth_url(),
        OutputFormat::Coords => position.to_coordinate_string(),
    }
}

/// Ask a permission question on stdin: (granted, do_not_ask).
fn prompt_permission(question: &str) -> anyhow::Result<(bool, bool)> {
    print!("{question} [y/n/always/never] ");
    std::io::stdout().flush().context("flushing prompt")?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("reading permission answer")?;
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok((true, false)),
        "always" => Ok((true, true)),
        "never" => Ok((false, true)),
        _ => Ok((false, false)),
    }
}

/// Execute an automation the way a terminal host can: print what the app
/// would copy or share, write GPX files for the GPX actions.
fn execute_action(position: &Position, action: &Automation) -> anyhow::Result<bool> {
    match action {
        Automation::Noop => Ok(true),
        Automation::Copy | Automation::ShareGeoUri => {
            println!("{}", position.to_geo_uri());
            Ok(true)
        }
        Automation::ShareGeoUriWithApp(package) => {
            println!("{} (target app: {package})", position.to_geo_uri());
            Ok(true)
        }
        Automation::SaveGpxPoints | Automation::ShareGpxRoute => {
            let path = std::path::Path::new("geolink.gpx");
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            gpx::write_gpx(position, file).context("writing GPX")?;
            println!("wrote {}", path.display());
            Ok(true)
        }
        Automation::ShareLiveLocation => {
            tracing::warn!("live-location sharing needs a device host; skipping");
            Ok(false)
        }
    }
}

pub async fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let config = load_app_config().context("loading configuration")?;

    let client = UrlClient::new(&UrlClientConfig {
        request_timeout_secs: config.request_timeout_secs,
        connect_timeout_secs: config.connect_timeout_secs,
        user_agent: config.user_agent.clone(),
    })
    .context("constructing HTTP client")?;

    let mut prefs = InMemoryPreferences::new()
        .with_automation_delay(Duration::from_secs(config.automation_delay_secs));
    if let Some(automation) = Automation::parse(&config.automation_action) {
        prefs = prefs.with_automation(automation);
    } else {
        tracing::warn!(
            action = %config.automation_action,
            "unknown automation action; running without one"
        );
    }

    let flag_permission = args
        .permission
        .as_deref()
        .map(Permission::from_str)
        .transpose()
        .map_err(|reason| anyhow::anyhow!("invalid --permission: {reason}"))?;
    if let Some(permission) = flag_permission.or(config.connection_permission) {
        prefs.set_connection_permission(permission);
    }

    // A local CLI run owns its feature set outright; no store to consult.
    let billing = StaticBilling::new(BillingStatus::Purchased("automation".to_owned()));
    let engine = Engine::new(&client, &prefs, &billing);

    let mut state = engine.run(&args.input).await;
    let mut result: Option<Position> = None;

    loop {
        if let Some(position) = state.position() {
            result = Some(position.clone());
        }
        state = match state {
            ConversionState::RequestedUnshortenPermission { .. } => {
                let (granted, do_not_ask) =
                    prompt_permission("Resolve this short link over the network?")?;
                let answered = if granted {
                    engine.grant(state.clone(), do_not_ask)
                } else {
                    engine.deny(state.clone(), do_not_ask)
                };
                match answered {
                    Some(next) => engine.run_from(next).await,
                    None => break,
                }
            }
            ConversionState::RequestedParseHtmlPermission { .. } => {
                let (granted, do_not_ask) =
                    prompt_permission("Download this page to extract coordinates?")?;
                let answered = if granted {
                    engine.grant(state.clone(), do_not_ask)
                } else {
                    engine.deny(state.clone(), do_not_ask)
                };
                match answered {
                    Some(next) => engine.run_from(next).await,
                    None => break,
                }
            }
            ConversionState::BasicActionReady {
                ref position,
                ref action,
            } => {
                let success = execute_action(position, action)?;
                match state.clone().action_ran(Some(success)) {
                    Some(next) => engine.run_from(next).await,
                    None => break,
                }
            }
            ConversionState::LocationRationaleRequested { .. } => {
                // No GPS in a terminal; decline the rationale and finish.
                let shown = state.clone().rationale_shown();
                match shown.and_then(|s| engine.deny(s, false)) {
                    Some(next) => engine.run_from(next).await,
                    None => break,
                }
            }
            other => {
                state = other;
                break;
            }
        };
        if state.is_terminal() {
            break;
        }
    }

    if let Some((message, input)) = state.failure() {
        bail!(
            "conversion of {:?} failed: {message}",
            geolink_core::text::truncate(input, 120)
        );
    }
    let Some(position) = result else {
        bail!("conversion ended without a result");
    };

    println!("{}", render(&position, args.format));

    if let Some(path) = &args.gpx {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        gpx::write_gpx(&position, file).context("writing GPX")?;
        tracing::info!(path = %path.display(), "wrote GPX");
    }

    Ok(())
}
