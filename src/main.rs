use clap::{Parser, Subcommand, builder::styling};
use eyre::Result;
use n8n_workflow_manager::cli::{self, StatusFilter};
use n8n_workflow_manager::generator::TemplateKind;
use owo_colors::OwoColorize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// n8n Workflow Manager: list, export, import, generate and edit n8n workflows from the shell
#[derive(Parser)]
#[command(name = "n8nwm", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source N8N_URL and N8N_API_KEY from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test the URL and API key against the n8n instance
    Auth,

    /// List workflows with their status, followed by statistics
    List {
        /// Only active workflows
        #[arg(long, conflicts_with_all = ["inactive", "archived"])]
        active: bool,

        /// Only inactive workflows
        #[arg(long, conflicts_with = "archived")]
        inactive: bool,

        /// Only archived workflows
        #[arg(long)]
        archived: bool,
    },

    /// Show statistics over every workflow
    Stats,

    /// Show one workflow, or save its document
    Get {
        /// Workflow id
        id: String,

        /// Write the workflow document to this file instead of printing details
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export every workflow to a directory, one JSON file each
    Pull {
        /// Directory to write workflow documents to
        #[arg(default_value = "workflows")]
        output_dir: PathBuf,
    },

    /// Create workflows from a JSON file or a directory of them
    Push {
        /// A workflow JSON file or a directory containing workflow JSON files
        path: PathBuf,

        /// Activate each workflow after creating it
        #[arg(short, long)]
        activate: bool,

        /// Create the workflow under this name instead (single file only)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Generate a new workflow from a built-in template
    New {
        /// Template to start from (see `templates`)
        template: TemplateKind,

        /// Name of the new workflow
        name: String,

        /// Webhook path for templates with a webhook trigger
        #[arg(long)]
        path: Option<String>,

        /// File to write the generated document to (defaults to `<name>.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also create the workflow on the n8n instance
        #[arg(long)]
        push: bool,
    },

    /// Activate a workflow
    Activate {
        /// Workflow name or id
        workflow: String,
    },

    /// Deactivate a workflow
    Deactivate {
        /// Workflow name or id
        workflow: String,
    },

    /// Rename a workflow
    Rename {
        /// Current workflow name (or id)
        old_name: String,

        /// New workflow name
        new_name: String,
    },

    /// Set a node parameter, e.g. `set-param "Chat Bot" "OpenAI" model '"gpt-4o"'`
    SetParam {
        /// Workflow name or id
        workflow: String,

        /// Node name (or id)
        node: String,

        /// Dotted parameter path, e.g. `options.systemMessage`
        path: String,

        /// New value; parsed as JSON, otherwise used as a string
        value: String,
    },

    /// Add a node to a workflow, e.g. `add-node "Chat Bot" '{"name":"Log","type":"n8n-nodes-base.noOp"}'`
    AddNode {
        /// Workflow name or id
        workflow: String,

        /// The node as a JSON object (`name`, `type`, optional `parameters`, ...)
        node: String,

        /// Existing node whose first `main` output feeds the new node
        #[arg(long)]
        connect_from: Option<String>,
    },

    /// Copy a workflow under a new name
    Duplicate {
        /// Workflow name or id to copy
        workflow: String,

        /// Name of the copy
        new_name: String,
    },

    /// Delete a workflow by id
    Delete {
        /// Workflow id
        id: String,
    },

    /// Delete every archived workflow
    PruneArchived {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List the built-in templates
    Templates,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    if let Err(e) = dotenv {
        log::debug!("Not loading {}: {}", cli.env.bright_black(), e);
    }

    match cli.command {
        Commands::Auth => {
            cli::test_auth().await?;
        }
        Commands::List {
            active,
            inactive,
            archived,
        } => {
            let filter = match (active, inactive, archived) {
                (true, _, _) => StatusFilter::Active,
                (_, true, _) => StatusFilter::Inactive,
                (_, _, true) => StatusFilter::Archived,
                _ => StatusFilter::All,
            };
            cli::list_workflows(filter).await?;
        }
        Commands::Stats => {
            cli::show_stats().await?;
        }
        Commands::Get { id, output } => {
            cli::get_workflow(&id, output.as_deref()).await?;
        }
        Commands::Pull { output_dir } => {
            let report = cli::pull_workflows(&output_dir).await?;
            if !report.is_complete() {
                log::warn!(
                    "{} workflow(s) could not be written",
                    report.failed.len().yellow()
                );
            }
        }
        Commands::Push {
            path,
            activate,
            name,
        } => {
            log::info!(
                "Pushing workflows from {}{}",
                path.display().bright_black(),
                if activate { " (activating)" } else { "" }
            );
            cli::push_workflows(&path, activate, name.as_deref()).await?;
        }
        Commands::New {
            template,
            name,
            path,
            output,
            push,
        } => {
            cli::new_workflow(template, &name, path.as_deref(), output, push).await?;
        }
        Commands::Activate { workflow } => {
            cli::set_workflow_active(&workflow, true).await?;
        }
        Commands::Deactivate { workflow } => {
            cli::set_workflow_active(&workflow, false).await?;
        }
        Commands::Rename { old_name, new_name } => {
            cli::rename_workflow(&old_name, &new_name).await?;
        }
        Commands::SetParam {
            workflow,
            node,
            path,
            value,
        } => {
            cli::set_node_parameter(&workflow, &node, &path, &value).await?;
        }
        Commands::AddNode {
            workflow,
            node,
            connect_from,
        } => {
            cli::add_node(&workflow, &node, connect_from.as_deref()).await?;
        }
        Commands::Duplicate { workflow, new_name } => {
            cli::duplicate_workflow(&workflow, &new_name).await?;
        }
        Commands::Delete { id } => {
            cli::delete_workflow(&id).await?;
        }
        Commands::PruneArchived { yes } => {
            cli::prune_archived(yes).await?;
        }
        Commands::Templates => {
            cli::list_templates();
        }
    }

    Ok(())
}
