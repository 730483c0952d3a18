//! Command dispatch

use std::io::Write;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::TreeView;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

/// Run the parsed command, writing command output to `out`.
pub fn execute_command(cli: &Cli, out: &mut dyn Write) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { file }) => cmd_show(&container(cli)?, file, out),
        Some(Commands::Tree { file }) => cmd_tree(&container(cli)?, file, out),
        Some(Commands::Check { file }) => cmd_check(&container(cli)?, file, out),
        Some(Commands::Config { command }) => cmd_config(cli, command, out),
        Some(Commands::Completion { shell }) => cmd_completion(*shell, out),
        None => Err(CliError::Usage(
            "no command given, see `orgtree --help`".to_string(),
        )),
    }
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

fn write_lines<I, S>(out: &mut dyn Write, lines: I) -> CliResult<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        writeln!(out, "{}", line.as_ref()).map_err(write_err)?;
    }
    Ok(())
}

fn write_err(e: std::io::Error) -> InfraError {
    InfraError::io("write output", e)
}

#[instrument(skip(container, out))]
fn cmd_show(container: &ServiceContainer, file: &Path, out: &mut dyn Write) -> CliResult<()> {
    let lines = container.hierarchy.render_file(file)?;
    write_lines(out, lines)
}

#[instrument(skip(container, out))]
fn cmd_tree(container: &ServiceContainer, file: &Path, out: &mut dyn Write) -> CliResult<()> {
    let tree = container.hierarchy.import_file(file)?;
    // every line, the last included, ends with a newline
    write!(out, "{}", TreeView::new(&tree)).map_err(write_err)?;
    Ok(())
}

#[instrument(skip(container, out))]
fn cmd_check(container: &ServiceContainer, file: &Path, out: &mut dyn Write) -> CliResult<()> {
    let summary = container.hierarchy.summarize_file(file)?;
    output::success(out, &format!("{} is a valid hierarchy", file.display())).map_err(write_err)?;
    output::detail(out, &format!("root:      {}", summary.root)).map_err(write_err)?;
    output::detail(out, &format!("employees: {}", summary.employees)).map_err(write_err)?;
    output::detail(out, &format!("depth:     {}", summary.depth)).map_err(write_err)?;
    output::detail(out, &format!("leaves:    {}", summary.leaves)).map_err(write_err)?;
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands, out: &mut dyn Write) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            let text = settings.to_toml()?;
            write!(out, "{}", text).map_err(write_err)?;
            Ok(())
        }
        ConfigCommands::Path => {
            output::header(out, "Config files").map_err(write_err)?;
            let written = match global_config_path() {
                Some(path) => output::detail(
                    out,
                    &format!(
                        "global:   {} ({})",
                        path.display(),
                        if path.exists() { "exists" } else { "not found" }
                    ),
                ),
                None => output::detail(out, "global:   <no config directory>"),
            };
            written.map_err(write_err)?;
            if let Some(path) = &cli.config {
                output::detail(out, &format!("explicit: {}", path.display())).map_err(write_err)?;
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine config directory".to_string())
            })?;
            init_config(&RealFileSystem, &path, *force)?;
            output::action(out, "Created", &path.display()).map_err(write_err)?;
            Ok(())
        }
    }
}

/// Write the config template to `path`, refusing to overwrite unless `force`.
pub fn init_config(fs: &dyn FileSystem, path: &Path, force: bool) -> CliResult<()> {
    if fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "config already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

fn cmd_completion(shell: Shell, out: &mut dyn Write) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    Ok(())
}
