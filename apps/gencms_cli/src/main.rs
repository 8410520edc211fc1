use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use draft_core::{
    config::{load_settings, normalize_api_base},
    Action, ActionReport, Capabilities, ContractViolation, DraftSession, HttpDraftApi,
    SessionView,
};
use shared::domain::DraftForm;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gencms", about = "Draft, refine and promote document units")]
struct Cli {
    /// Draft service base address; overrides gencms.toml and the environment.
    #[arg(long)]
    api_base: Option<String>,
    /// Per-request deadline in seconds.
    #[arg(long)]
    deadline_secs: Option<u64>,
    /// Key of the document unit being drafted.
    #[arg(long)]
    dm_key: String,
    /// Expose only generate, promote and download.
    #[arg(long)]
    minimal: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print suggested form values for the document unit.
    Prefill,
    /// Generate one draft and print it.
    Generate {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Generate, then optionally refine and promote.
    Draft {
        #[command(flatten)]
        form: FormArgs,
        /// Number of refinement passes.
        #[arg(long, default_value_t = 0)]
        refine: u32,
        #[arg(long, default_value = "")]
        feedback: String,
        #[arg(long)]
        promote: bool,
        /// Directory to write the final XML into, under the suggested filename.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct FormArgs {
    /// Fill the form from the service before applying the flags below.
    #[arg(long)]
    prefill: bool,
    #[arg(long, default_value = "")]
    objective: String,
    #[arg(long, default_value = "")]
    constraints: String,
    #[arg(long, default_value = "")]
    seed_outline: String,
    #[arg(long, default_value = "")]
    safety_focus: String,
}

impl FormArgs {
    /// Non-empty flags win over whatever the form already holds.
    fn overlay(&self, form: &mut DraftForm) {
        let fields = [
            (&self.objective, &mut form.objective),
            (&self.constraints, &mut form.constraints),
            (&self.seed_outline, &mut form.seed_outline),
            (&self.safety_focus, &mut form.safety_focus),
        ];
        for (flag, field) in fields {
            if !flag.is_empty() {
                field.clone_from(flag);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(api_base) = &cli.api_base {
        settings.api_base = normalize_api_base(api_base)?;
    }
    if cli.deadline_secs.is_some() {
        settings.request_deadline_secs = cli.deadline_secs;
    }
    info!(api_base = %settings.api_base, "using draft service");

    let capabilities = if cli.minimal {
        Capabilities::minimal()
    } else {
        Capabilities::full()
    };
    let api = Arc::new(HttpDraftApi::from_settings(&settings));
    let dm_key = cli.dm_key.clone();
    let mut session = DraftSession::mount(api, capabilities, move || Some(dm_key))?;
    if let Some(deadline) = settings.request_deadline() {
        session = session.with_deadline(deadline);
    }

    let outcome = run(&session, cli.command).await;
    session.close().await;
    outcome
}

async fn run(session: &DraftSession, command: Command) -> Result<()> {
    match command {
        Command::Prefill => {
            step(session, Action::Prefill, session.prefill().await).await?;
            let form = session.snapshot().await.form;
            println!("objective: {}", form.objective);
            println!("constraints: {}", form.constraints);
            println!("seed_outline:\n{}", form.seed_outline);
            println!("safety_focus: {}", form.safety_focus);
        }
        Command::Generate { form, save } => {
            fill_form(session, &form).await?;
            step(session, Action::Generate, session.generate().await).await?;
            finish(session, save).await?;
        }
        Command::Draft {
            form,
            refine,
            feedback,
            promote,
            save,
        } => {
            fill_form(session, &form).await?;
            step(session, Action::Generate, session.generate().await).await?;
            for pass in 1..=refine {
                info!(pass, "refining draft");
                step(session, Action::Refine, session.refine(&feedback).await).await?;
            }
            if promote {
                step(session, Action::Promote, session.promote().await).await?;
            }
            finish(session, save).await?;
        }
    }
    Ok(())
}

async fn fill_form(session: &DraftSession, args: &FormArgs) -> Result<()> {
    if args.prefill {
        step(session, Action::Prefill, session.prefill().await).await?;
    }
    let mut form = session.snapshot().await.form;
    args.overlay(&mut form);
    session.update_form(form).await?;
    Ok(())
}

async fn step(
    session: &DraftSession,
    action: Action,
    report: std::result::Result<ActionReport, ContractViolation>,
) -> Result<()> {
    match report.with_context(|| format!("{action} was rejected"))? {
        ActionReport::Completed => Ok(()),
        ActionReport::Failed(message) => {
            render(&session.view().await);
            bail!("{action} failed: {message}")
        }
        ActionReport::Superseded => bail!("{action} response was discarded"),
    }
}

async fn finish(session: &DraftSession, save: Option<PathBuf>) -> Result<()> {
    let view = session.view().await;
    render(&view);

    let Some(dir) = save else {
        return Ok(());
    };
    let link = view
        .download
        .context("no draft is available for download")?;
    let filename = PathBuf::from(&link.filename)
        .file_name()
        .map(PathBuf::from)
        .context("draft service suggested an empty filename")?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create '{}'", dir.display()))?;
    let path = dir.join(filename);
    fs::write(&path, link.xml.as_bytes())
        .with_context(|| format!("failed to write draft to '{}'", path.display()))?;
    info!(path = %path.display(), "draft saved");
    Ok(())
}

fn render(view: &SessionView) {
    println!("{}", view.output_text);
    let enabled: Vec<String> = [
        Action::Prefill,
        Action::Generate,
        Action::Refine,
        Action::Promote,
        Action::Download,
    ]
    .into_iter()
    .filter(|action| view.enabled.is_enabled(*action))
    .map(|action| action.to_string())
    .collect();
    info!(state = %view.state, enabled = %enabled.join(","), "session settled");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_draft_flow() {
        let cli = Cli::try_parse_from([
            "gencms",
            "--dm-key",
            "DMC-57",
            "draft",
            "--objective",
            "Removal",
            "--refine",
            "2",
            "--promote",
        ])
        .expect("parse");
        assert_eq!(cli.dm_key, "DMC-57");
        let Command::Draft {
            form,
            refine,
            promote,
            ..
        } = cli.command
        else {
            panic!("expected draft command");
        };
        assert_eq!(form.objective, "Removal");
        assert_eq!(refine, 2);
        assert!(promote);
    }

    #[test]
    fn overlay_keeps_prefilled_values_for_empty_flags() {
        let mut form = DraftForm {
            objective: "from service".to_string(),
            constraints: "from service".to_string(),
            ..DraftForm::default()
        };
        let args = FormArgs {
            objective: "from flag".to_string(),
            ..FormArgs::default()
        };
        args.overlay(&mut form);
        assert_eq!(form.objective, "from flag");
        assert_eq!(form.constraints, "from service");
    }
}
