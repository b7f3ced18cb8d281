use anyhow::{bail, Context, Result};
use autospector_core::model::DamageReport;
use autospector_core::overlay::build_overlay;
use autospector_core::report_text::render_text;
use autospector_core::session::boot;
use autospector_core::store::FileStore;
use autospector_core::users::{authenticate, clear_user, load_user, save_user, AuthForm, AuthMode};
use autospector_image::export::export_png;
use autospector_image::thumbnail::JpegThumbnailer;
use autospector_inference::{api_key_from_env, InferenceClient, InferenceConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "autospector")]
#[command(about = "Vehicle damage inspection from a single photo.")]
struct Cli {
    /// Where the signed-in user and history are kept.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Analyze {
        input: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
        /// Also write the photo with damage boxes burned in (PNG).
        #[arg(long)]
        overlay: Option<PathBuf>,
        /// Plain-text report instead of JSON.
        #[arg(long)]
        text: bool,
        /// Keep the full image data URI in the JSON output.
        #[arg(long)]
        embed_image: bool,
        #[arg(long)]
        no_history: bool,
        /// Skip the backend even when an API key is set.
        #[arg(long)]
        demo: bool,
        #[arg(long)]
        model: Option<String>,
    },
    History {
        #[command(subcommand)]
        cmd: HistoryCommand,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    List,
    Show {
        /// Full report id or its short reference.
        id: String,
        #[arg(long)]
        json: bool,
    },
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir)?;
    match cli.cmd {
        Command::Analyze {
            input,
            report,
            overlay,
            text,
            embed_image,
            no_history,
            demo,
            model,
        } => {
            analyze(
                &input,
                &data_dir,
                AnalyzeOptions {
                    report: report.as_deref(),
                    overlay: overlay.as_deref(),
                    text,
                    embed_image,
                    no_history,
                    demo,
                    model,
                },
            )
            .await
        }
        Command::History { cmd } => history(&data_dir, cmd),
        Command::Login { email, password } => sign_in(
            &data_dir,
            AuthMode::Login,
            AuthForm {
                email,
                password,
                ..AuthForm::default()
            },
        ),
        Command::Register {
            name,
            email,
            password,
        } => sign_in(
            &data_dir,
            AuthMode::Register,
            AuthForm {
                name,
                email,
                password,
            },
        ),
        Command::Logout => {
            clear_user(&FileStore::new(&data_dir)).context("sign out")?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            match load_user(&FileStore::new(&data_dir)) {
                Some(user) => println!("{} <{}>", user.name, user.email),
                None => println!("Not signed in."),
            }
            Ok(())
        }
    }
}

struct AnalyzeOptions<'a> {
    report: Option<&'a Path>,
    overlay: Option<&'a Path>,
    text: bool,
    embed_image: bool,
    no_history: bool,
    demo: bool,
    model: Option<String>,
}

async fn analyze(input: &Path, data_dir: &Path, opts: AnalyzeOptions<'_>) -> Result<()> {
    ensure_input_file(input)?;
    let image = autospector_image::acquire::load_file(input)
        .with_context(|| format!("load image: {input:?}"))?;

    let mut cfg = InferenceConfig::from_env();
    if let Some(model) = opts.model {
        cfg.model = model;
    }
    let client = if opts.demo {
        InferenceClient::demo(cfg)
    } else {
        InferenceClient::new(cfg, api_key_from_env()).context("build inference client")?
    };
    if client.is_demo() {
        tracing::info!("running in demo mode, results are simulated");
    }

    let report = client.analyze(&image).await;

    if let Some(path) = opts.overlay {
        let overlay = build_overlay(&report.damages);
        for skipped in &overlay.skipped {
            tracing::warn!(damage = %skipped.damage_id, reason = %skipped.reason, "damage not drawn");
        }
        ensure_parent(path);
        export_png(&image, &overlay, path).with_context(|| format!("write overlay: {path:?}"))?;
    }

    if !opts.no_history {
        let (state, mut history) = boot(FileStore::new(data_dir), Box::new(JpegThumbnailer::default()));
        if state.is_signed_in() {
            history.record(&report);
        } else {
            tracing::debug!("not signed in, report not added to history");
        }
    }

    let out = if opts.text {
        render_text(&report)
    } else {
        let mut shown = report;
        if !opts.embed_image {
            shown.image_url = None;
        }
        serde_json::to_string_pretty(&shown).context("serialize report")?
    };
    emit(&out, opts.report)
}

fn history(data_dir: &Path, cmd: HistoryCommand) -> Result<()> {
    let (state, mut history) = boot(FileStore::new(data_dir), Box::new(JpegThumbnailer::default()));
    if !state.is_signed_in() {
        bail!("history requires a signed-in user (run `autospector login`).");
    }

    match cmd {
        HistoryCommand::List => {
            if history.is_empty() {
                println!("No inspections yet.");
            }
            for r in history.list() {
                println!("{}", history_row(r));
            }
        }
        HistoryCommand::Show { id, json } => {
            let report = find_report(history.list(), &id)
                .with_context(|| format!("no report with id {id:?}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(report).context("serialize report")?);
            } else {
                print!("{}", render_text(report));
            }
        }
        HistoryCommand::Clear => {
            history.clear().context("clear history")?;
            println!("History cleared.");
        }
    }
    Ok(())
}

fn history_row(r: &DamageReport) -> String {
    let date = r
        .date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let issues = match r.issue_count() {
        0 => "passed".to_string(),
        1 => "1 issue".to_string(),
        n => format!("{n} issues"),
    };
    format!(
        "#{:<10} {date}  {:>3}/100 {:<9} {:<9} {}  | {}",
        r.short_ref().unwrap_or("-"),
        r.score(),
        r.condition().as_str(),
        issues,
        r.parts_preview(3),
        r.summary
    )
}

fn find_report<'a>(reports: &'a [DamageReport], id: &str) -> Option<&'a DamageReport> {
    let id = id.trim_start_matches('#');
    reports
        .iter()
        .find(|r| r.id.as_deref() == Some(id))
        .or_else(|| reports.iter().find(|r| r.short_ref() == Some(id)))
}

fn sign_in(data_dir: &Path, mode: AuthMode, form: AuthForm) -> Result<()> {
    let user = authenticate(mode, &form)?;
    save_user(&FileStore::new(data_dir), &user).context("save user")?;
    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

fn resolve_data_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(dir) => Ok(dir),
        None => dirs::data_dir()
            .map(|d| d.join("autospector"))
            .context("no per-user data directory on this platform; pass --data-dir"),
    }
}

fn emit(out: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            ensure_parent(path);
            std::fs::write(path, out).with_context(|| format!("write report: {path:?}"))
        }
        None => {
            println!("{out}");
            Ok(())
        }
    }
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
