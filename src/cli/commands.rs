//! Command dispatch

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::application::services::{
    DirectProbeOutcome, ProbeOutcome, ReportWriter, Session, Submission,
};
use crate::application::{ApplicationError, ResultsView, ViewKind};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, FrontendConfig, Settings};
use crate::domain::{example, to_layout, FailureReport, ParseTreeNode, TreeDisplay, EXAMPLES};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, RealFileSystem};
use crate::render::{DiagramRenderer, DiagramSurface};

const DEFAULT_SVG: &str = "parse_tree.svg";
const DEFAULT_HTML: &str = "report.html";

/// Execute the parsed command line.
pub async fn execute(cli: Cli) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }
    if let Commands::Explain { message } = &cli.command {
        explain(message);
        return Ok(());
    }

    let settings = load_settings(&cli)?;
    match cli.command {
        Commands::Parse { expression, output } => parse(settings, &expression, &output).await,
        Commands::Examples { run: None, .. } => {
            list_examples();
            Ok(())
        }
        Commands::Examples {
            run: Some(number),
            output,
        } => {
            let chosen = example(number).ok_or_else(|| {
                CliError::InvalidArgs(format!(
                    "no example {number}, choose 1 to {}",
                    EXAMPLES.len()
                ))
            })?;
            output::action("Example", &format!("{} ({})", chosen.expression, chosen.description));
            parse(settings, chosen.expression, &output).await
        }
        Commands::Ping => ping(settings).await,
        Commands::Validate { expression } => validate(settings, &expression).await,
        Commands::Render { input, output } => render(settings, &input, output.as_deref()),
        Commands::Config { command } => config(settings, command),
        Commands::Completion { .. } | Commands::Explain { .. } => Ok(()),
    }
}

/// Layered settings with command line flags on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load()?;
    if let Some(backend) = &cli.backend {
        settings.backend_url = backend.clone();
    }
    if let Some(origin) = &cli.origin {
        settings.frontend_origin = Some(origin.clone());
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

#[instrument(skip(settings, out))]
async fn parse(settings: Settings, expression: &str, out: &OutputArgs) -> CliResult<()> {
    let container = ServiceContainer::new(settings)?;
    let mut session = Session::bootstrap(&container).await?;
    debug!("using backend {}", session.backend());

    let outcome = session.run(expression).await;
    let submission = outcome.submission?;

    if out.json {
        output::info(&serde_json::to_string_pretty(&submission_json(&submission)).unwrap_or_default());
    } else {
        print_probe(&outcome.probe, &outcome.direct);
        print_view(&session.view);
        output::connection(&session.connection());
    }

    let writer = ReportWriter::new(container.fs.clone(), container.settings.output_dir.clone());
    write_outputs(&writer, &session, out)?;

    match submission {
        Submission::Parsed(_) => Ok(()),
        Submission::Rejected(report) => Err(CliError::Rejected(report.message)),
        Submission::Failed(report) => Err(CliError::Unavailable(report.message)),
    }
}

fn write_outputs(writer: &ReportWriter, session: &Session, out: &OutputArgs) -> CliResult<()> {
    let view = &session.view;
    if let Some(path) = &out.svg {
        if view.diagram_visible {
            let target = writer.target(path.as_deref(), DEFAULT_SVG);
            writer.write(&target, &view.surface.to_svg())?;
            output::action("Diagram", &target.display());
        } else {
            output::warning("no diagram to write, the expression was not evaluated");
        }
    }
    if let Some(path) = &out.html {
        let target = writer.target(path.as_deref(), DEFAULT_HTML);
        let html = view.to_html(&session.connection(), &session.log_lines());
        writer.write(&target, &html)?;
        output::action("Report", &target.display());
    }
    Ok(())
}

fn print_probe(probe: &ProbeOutcome, direct: &DirectProbeOutcome) {
    let state = probe.state();
    if probe.is_connected() {
        output::success(&format!("Ping: {}", state.message));
    } else {
        output::failure(&format!("Ping: {}", state.message));
    }
    match direct {
        DirectProbeOutcome::Reachable(body) => output::success(&format!("Direct: {body}")),
        DirectProbeOutcome::Unreachable(report) => {
            output::failure(&format!("Direct: {}", report.message))
        }
    }
}

fn print_view(view: &ResultsView) {
    match view.kind {
        ViewKind::Valid => output::success(&view.status),
        ViewKind::Invalid | ViewKind::Error => output::failure(&view.status),
        ViewKind::Processing | ViewKind::Hidden => output::info(&view.status),
    }
    for line in &view.body {
        output::detail(line);
    }
    if let Some(tree) = &view.tree {
        output::action("Postfix", &view.postfix.iter().join(" "));
        output::header("Parse tree");
        output::info(&tree.to_tree_string());
    }
}

fn submission_json(submission: &Submission) -> Value {
    match submission {
        Submission::Parsed(success) => json!({
            "valid": true,
            "result": success.result,
            "postfix": success.postfix,
            "parse_tree": success.tree,
            "input_expression": success.input_expression,
        }),
        Submission::Rejected(report) | Submission::Failed(report) => json!({
            "valid": false,
            "category": report.category.label(),
            "error": report.message,
        }),
    }
}

fn list_examples() {
    output::header("Valid expressions");
    for (i, ex) in EXAMPLES.iter().enumerate().filter(|(_, ex)| ex.valid) {
        output::detail(&format!("{:>2}. {:<16} {}", i + 1, ex.expression, ex.description));
    }
    output::header("Invalid expressions");
    for (i, ex) in EXAMPLES.iter().enumerate().filter(|(_, ex)| !ex.valid) {
        output::detail(&format!("{:>2}. {:<16} {}", i + 1, ex.expression, ex.description));
    }
    output::hint(&"bodmas-viz examples --run N submits example N");
}

async fn ping(settings: Settings) -> CliResult<()> {
    let container = ServiceContainer::new(settings)?;
    let mut session = Session::bootstrap(&container).await?;
    output::action("API", session.backend());

    let outcome = session.ping().await;
    print_probe(&outcome.probe, &outcome.direct);
    output::connection(&session.connection());

    if let DirectProbeOutcome::Unreachable(report) = &outcome.direct {
        print_view(&session.view);
        return Err(CliError::Unavailable(report.message.clone()));
    }
    if !outcome.probe.is_connected() {
        return Err(CliError::Unavailable(outcome.probe.state().message));
    }
    Ok(())
}

async fn validate(settings: Settings, expression: &str) -> CliResult<()> {
    let container = ServiceContainer::new(settings)?;
    let session = Session::bootstrap(&container).await?;

    let valid = session.client().validate(expression).await.map_err(|e| match e {
        ApplicationError::OperationFailed { context, source } => {
            CliError::Unavailable(format!("{context}: {source}"))
        }
        other => other.into(),
    })?;
    if valid {
        output::success(&format!("{expression} is valid"));
        Ok(())
    } else {
        output::failure(&format!("{expression} is not valid"));
        Err(CliError::Rejected(expression.to_string()))
    }
}

fn explain(message: &str) {
    let report = FailureReport::explain(message);
    output::action("Category", &report.category);
    output::info(&report.message);
    if let Some(guidance) = report.guidance {
        output::detail(&guidance.hint);
        output::hint(&format!("Example: {}", guidance.example));
    }
}

#[instrument(skip(settings))]
fn render(settings: Settings, input: &Path, out: Option<&Path>) -> CliResult<()> {
    let writer = ReportWriter::new(Arc::new(RealFileSystem), settings.output_dir.clone());
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| InfraError::io("read parse tree from stdin", e))?;
        buf
    } else {
        writer.read(input)?
    };

    let tree = decode_tree(&text)?;
    let layout = to_layout(&tree);
    let mut surface = DiagramSurface::new();
    let diagram = DiagramRenderer::new(settings.canvas).render(&layout, &mut surface);
    output::info(&layout.to_tree_string());

    let target = writer.target(out, DEFAULT_SVG);
    writer.write(&target, &surface.to_svg())?;
    output::action(
        "Diagram",
        &format!("{} ({} nodes)", target.display(), diagram.nodes.len()),
    );
    Ok(())
}

/// Accepts a bare wire tree or a whole `/parse` response.
fn decode_tree(text: &str) -> CliResult<ParseTreeNode> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CliError::InvalidArgs(format!("input is not JSON: {e}")))?;
    let tree = match value.get("parse_tree") {
        Some(inner) => inner,
        None => &value,
    };
    Ok(ParseTreeNode::from_wire(tree).map_err(ApplicationError::from)?)
}

fn config(settings: Settings, command: ConfigCommands) -> CliResult<()> {
    let writer = ReportWriter::new(Arc::new(RealFileSystem), settings.output_dir.clone());
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = if global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?
            } else {
                local_config_path(&current_dir()?)
            };
            if writer.write_new(&path, &Settings::template())? {
                output::action("Created", &path.display());
            } else {
                output::warning(&format!("{} already exists", path.display()));
            }
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::action("Global", &"(unavailable)"),
            }
            output::action("Local", &local_config_path(&current_dir()?).display());
        }
        ConfigCommands::Frontend {
            output: path,
            debug_frontend,
        } => {
            let doc = FrontendConfig::for_backend(&settings.backend_endpoint()?, debug_frontend);
            writer.write(&path, &doc.to_json()?)?;
            output::action("Configuration written to", &path.display());
        }
    }
    Ok(())
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir()
        .map_err(|e| CliError::Infra(InfraError::io("determine current directory", e)))
}
