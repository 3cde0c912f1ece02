//! CLI helper functions

use crate::{
    analyze::{self, ExportReport, PruneReport, WorkflowSummary},
    client::{ListQuery, N8nClient},
    config::ClientConfig,
    generator::TemplateKind,
    workflow::{ConnectionTarget, Connections, Node, WorkflowDefinition, document},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Number of node types shown in statistics
const TOP_NODE_TYPES: usize = 10;

/// Which workflows `list` shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
    Archived,
}

impl StatusFilter {
    fn query(&self) -> ListQuery {
        match self {
            Self::Active => ListQuery::active(true),
            Self::Inactive => ListQuery::active(false),
            Self::All | Self::Archived => ListQuery::default(),
        }
    }

    fn keep(&self, workflow: &WorkflowDefinition) -> bool {
        match self {
            Self::Archived => workflow.is_archived(),
            _ => true,
        }
    }
}

/// Load the n8n client from environment variables
///
/// Expected environment variables:
/// - N8N_URL: n8n base URL (optional, defaults to http://localhost:5678)
/// - N8N_API_KEY: API key (required)
/// - N8N_TUNNEL_URL / WEBHOOK_URL: public tunnel URL (optional)
/// - N8N_TIMEOUT_SECS: request timeout in seconds (optional)
pub fn load_n8n_client() -> Result<N8nClient> {
    let config = ClientConfig::from_env().context("Failed to read n8n configuration")?;
    let client = N8nClient::try_new(&config).context("Failed to create n8n client")?;

    if let Some(tunnel) = client.tunnel_url() {
        log::info!("Tunnel URL: {}", tunnel.as_str().bright_black());
    }
    Ok(client)
}

/// Test the URL and API key against the n8n instance
pub async fn test_auth() -> Result<()> {
    let client = load_n8n_client()?;
    log::info!("Testing authorization against {}", client);

    client
        .test_connection()
        .await
        .with_context(|| format!("Failed to connect to {}", client.url()))?;

    println!("{} Connected to {}", "✔".green(), client.url().as_str().cyan());
    Ok(())
}

/// Print one status line per workflow, then statistics
pub async fn list_workflows(filter: StatusFilter) -> Result<usize> {
    let client = load_n8n_client()?;

    let workflows: Vec<_> = client
        .list_workflows_with(&filter.query())
        .await
        .context("Failed to list workflows")?
        .into_iter()
        .filter(|w| filter.keep(w))
        .collect();

    for workflow in &workflows {
        println!("{}", status_line(workflow));
    }
    if workflows.is_empty() {
        println!("{}", "No workflows found".bright_black());
    }

    println!();
    print_summary(&analyze::summarize(&workflows));
    Ok(workflows.len())
}

/// Print statistics over every workflow on the instance
pub async fn show_stats() -> Result<WorkflowSummary> {
    let client = load_n8n_client()?;
    let workflows = client
        .list_workflows()
        .await
        .context("Failed to list workflows")?;

    let summary = analyze::summarize(&workflows);
    print_summary(&summary);
    Ok(summary)
}

/// Show one workflow, or write its document to `output`
pub async fn get_workflow(id: &str, output: Option<&Path>) -> Result<()> {
    let client = load_n8n_client()?;
    let workflow = client
        .get_workflow(id)
        .await
        .with_context(|| format!("Failed to fetch workflow {}", id))?;

    match output {
        Some(path) => {
            write_document(&workflow, path)?;
            println!(
                "{} Wrote {} to {}",
                "✔".green(),
                workflow.name.cyan(),
                path.display().bright_black()
            );
        }
        None => print_details(&client, &workflow),
    }
    Ok(())
}

/// Export every workflow to `output_dir`
///
/// Individual write failures are reported but do not fail the command.
pub async fn pull_workflows(output_dir: impl AsRef<Path>) -> Result<ExportReport> {
    let output_dir = output_dir.as_ref();
    let client = load_n8n_client()?;

    log::info!("Pulling workflows to {}", output_dir.display().bright_black());
    let report = analyze::fetch_and_export_all(&client, output_dir)
        .await
        .with_context(|| format!("Failed to export workflows to {}", output_dir.display()))?;

    print_summary(&report.summary);
    println!();
    println!(
        "{} Exported {} of {} workflow(s) to {}",
        "✔".green(),
        report.exported.len(),
        report.summary.total,
        output_dir.display().bright_black()
    );
    for failure in &report.failed {
        println!("{} {}: {}", "✘".red(), failure.workflow, failure.error);
    }
    Ok(report)
}

/// Create the workflow(s) in a file or directory on the instance
///
/// `name` renames a single pushed workflow.
pub async fn push_workflows(
    path: impl AsRef<Path>,
    activate: bool,
    name: Option<&str>,
) -> Result<usize> {
    let path = path.as_ref();
    let client = load_n8n_client()?;

    let count = analyze::import_path(&client, path, activate, name)
        .await
        .with_context(|| format!("Failed to import workflows from {}", path.display()))?;

    println!(
        "{} Created {} workflow(s) from {}",
        "✔".green(),
        count,
        path.display().bright_black()
    );
    Ok(count)
}

/// Generate a workflow from a template, write it, and optionally create it on the instance
pub async fn new_workflow(
    template: TemplateKind,
    name: &str,
    webhook_path: Option<&str>,
    output: Option<PathBuf>,
    push: bool,
) -> Result<WorkflowDefinition> {
    let workflow = template
        .build(name, webhook_path)
        .with_context(|| format!("Failed to build {} workflow", template))?;

    let output = output.unwrap_or_else(|| {
        let stem = crate::storage::sanitize_file_stem(name);
        PathBuf::from(format!("{}.json", if stem.is_empty() { "workflow" } else { &stem }))
    });
    write_document(&workflow, &output)?;
    println!(
        "{} Generated {} workflow {} ({} nodes) at {}",
        "✔".green(),
        template.cyan(),
        workflow.name.cyan(),
        workflow.nodes.len(),
        output.display().bright_black()
    );

    if !push {
        return Ok(workflow);
    }

    let client = load_n8n_client()?;
    let created = client
        .create_workflow(&workflow)
        .await
        .with_context(|| format!("Failed to create workflow {}", workflow.name))?;
    println!("{} Created {}", "✔".green(), created.label().cyan());
    if let Some(id) = &created.id {
        println!("  {}", client.editor_url(id)?.as_str().bright_black());
    }
    Ok(created)
}

/// Activate or deactivate a workflow given by name or id
pub async fn set_workflow_active(reference: &str, active: bool) -> Result<WorkflowDefinition> {
    let client = load_n8n_client()?;
    let workflow = resolve_workflow(&client, reference).await?;
    let id = workflow_id(&workflow)?;

    let updated = client
        .set_active(id, active)
        .await
        .with_context(|| format!("Failed to change state of {}", workflow.label()))?;

    println!("{}", status_line(&updated));
    Ok(updated)
}

/// Rename a workflow given by its current name
pub async fn rename_workflow(old_name: &str, new_name: &str) -> Result<WorkflowDefinition> {
    let client = load_n8n_client()?;
    let mut workflow = resolve_workflow(&client, old_name).await?;
    let id = workflow_id(&workflow)?.to_string();

    workflow.name = new_name.to_string();
    let updated = client
        .update_workflow(&id, &workflow)
        .await
        .with_context(|| format!("Failed to rename {}", old_name))?;

    println!(
        "{} Renamed {} to {}",
        "✔".green(),
        old_name.cyan(),
        updated.name.cyan()
    );
    Ok(updated)
}

/// Set one node parameter and save the workflow
///
/// `value` is parsed as JSON when possible, otherwise used as a plain string.
pub async fn set_node_parameter(
    reference: &str,
    node: &str,
    path: &str,
    value: &str,
) -> Result<WorkflowDefinition> {
    let client = load_n8n_client()?;
    let mut workflow = resolve_workflow(&client, reference).await?;
    let id = workflow_id(&workflow)?.to_string();

    let value = parse_parameter_value(value);
    let previous = workflow
        .set_node_parameter(node, path, value.clone())
        .with_context(|| format!("Failed to set {} on node {}", path, node))?;

    let updated = client
        .update_workflow(&id, &workflow)
        .await
        .with_context(|| format!("Failed to save {}", workflow.label()))?;

    println!(
        "{} {}.{}: {} {} {}",
        "✔".green(),
        node.cyan(),
        path,
        previous
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(unset)".to_string())
            .bright_black(),
        "→".bright_black(),
        value
    );
    Ok(updated)
}

/// Append a node (given as JSON) to a workflow, optionally fed by an existing node
pub async fn add_node(
    reference: &str,
    node_json: &str,
    connect_from: Option<&str>,
) -> Result<WorkflowDefinition> {
    let (node, connections) = node_addition(node_json, connect_from)?;
    let node_name = node.reference().to_string();

    let client = load_n8n_client()?;
    let mut workflow = resolve_workflow(&client, reference).await?;
    let id = workflow_id(&workflow)?.to_string();

    workflow
        .add_node(node, connections)
        .with_context(|| format!("Failed to add node {} to {}", node_name, workflow.label()))?;

    let updated = client
        .update_workflow(&id, &workflow)
        .await
        .with_context(|| format!("Failed to save {}", workflow.label()))?;

    println!(
        "{} Added node {} to {}",
        "✔".green(),
        node_name.cyan(),
        updated.label().cyan()
    );
    Ok(updated)
}

/// Copy a workflow under a new name
pub async fn duplicate_workflow(reference: &str, new_name: &str) -> Result<WorkflowDefinition> {
    let client = load_n8n_client()?;
    let source = resolve_workflow(&client, reference).await?;

    let created = client
        .create_workflow(&source.duplicate(new_name))
        .await
        .with_context(|| format!("Failed to duplicate {}", source.label()))?;

    println!(
        "{} Duplicated {} as {}",
        "✔".green(),
        source.label().cyan(),
        created.label().cyan()
    );
    Ok(created)
}

/// Delete one workflow by id
pub async fn delete_workflow(id: &str) -> Result<()> {
    let client = load_n8n_client()?;
    client
        .delete_workflow(id)
        .await
        .with_context(|| format!("Failed to delete workflow {}", id))?;

    println!("{} Deleted {}", "✔".green(), id.cyan());
    Ok(())
}

/// Delete every archived workflow, asking first unless `yes` is set
pub async fn prune_archived(yes: bool) -> Result<PruneReport> {
    let client = load_n8n_client()?;

    if !yes {
        let archived = client
            .list_workflows()
            .await
            .context("Failed to list workflows")?
            .into_iter()
            .filter(WorkflowDefinition::is_archived)
            .count();

        if archived == 0 {
            println!("{}", "No archived workflows".bright_black());
            return Ok(PruneReport::default());
        }
        if !confirm(&format!("Delete {} archived workflow(s)?", archived))? {
            println!("{}", "Cancelled".bright_black());
            return Ok(PruneReport::default());
        }
    }

    let report = analyze::prune_archived(&client)
        .await
        .context("Failed to prune archived workflows")?;

    println!(
        "{} Deleted {} archived workflow(s), {} failed",
        "✔".green(),
        report.deleted,
        report.failed
    );
    Ok(report)
}

/// Print the built-in templates
pub fn list_templates() {
    for kind in TemplateKind::all() {
        println!(
            "{:<20} {}",
            kind.name().green(),
            kind.description().bright_black()
        );
    }
}

/// Find a workflow by exact name, falling back to treating `reference` as an id
async fn resolve_workflow(client: &N8nClient, reference: &str) -> Result<WorkflowDefinition> {
    if let Some(workflow) = client
        .find_by_name(reference)
        .await
        .context("Failed to look up workflow by name")?
    {
        return Ok(workflow);
    }

    log::debug!("No workflow named {}, trying it as an id", reference.cyan());
    client
        .get_workflow(reference)
        .await
        .with_context(|| format!("No workflow named or with id '{}'", reference))
}

fn workflow_id(workflow: &WorkflowDefinition) -> Result<&str> {
    workflow
        .id
        .as_deref()
        .ok_or_else(|| eyre::eyre!("Workflow {} has no id", workflow.name))
}

fn parse_parameter_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn node_addition(raw: &str, connect_from: Option<&str>) -> Result<(Node, Connections)> {
    let node: Node = serde_json::from_str(raw).context("Node must be a JSON object with a 'type'")?;

    let mut connections = Connections::new();
    if let Some(source) = connect_from {
        connections.entry(source.to_string()).or_default().insert(
            crate::workflow::MAIN_CONNECTION.to_string(),
            vec![vec![ConnectionTarget::main(node.reference())]],
        );
    }
    Ok((node, connections))
}

fn write_document(workflow: &WorkflowDefinition, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = document::to_string_pretty(workflow)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn status_line(workflow: &WorkflowDefinition) -> String {
    let icon = if workflow.active {
        "●".green().to_string()
    } else {
        "○".bright_black().to_string()
    };
    let archived = if workflow.is_archived() {
        format!(" {}", "[archived]".yellow())
    } else {
        String::new()
    };
    format!(
        "{} {} {}{}",
        icon,
        workflow.id.as_deref().unwrap_or("-").bright_black(),
        workflow.name,
        archived
    )
}

fn print_details(client: &N8nClient, workflow: &WorkflowDefinition) {
    println!("{}", status_line(workflow));
    if let Some(Ok(url)) = workflow.id.as_deref().map(|id| client.editor_url(id)) {
        println!("  {}", url.as_str().bright_black());
    }
    println!("  {} node(s):", workflow.nodes.len());
    for node in &workflow.nodes {
        println!("    {} {}", node.reference().cyan(), node.node_type.bright_black());
    }
    let edges = workflow.edges().count();
    println!("  {} connection(s)", edges);
}

fn print_summary(summary: &WorkflowSummary) {
    println!("{}", "Statistics".bold());
    println!("  Total:    {}", summary.total);
    println!("  Active:   {}", summary.active.green());
    println!("  Inactive: {}", summary.inactive.bright_black());
    if summary.archived > 0 {
        println!("  Archived: {}", summary.archived.yellow());
    }

    let top = summary.top_node_types(TOP_NODE_TYPES);
    if !top.is_empty() {
        println!("  Node types:");
        for (node_type, count) in top {
            println!("    {:>4}  {}", count, node_type.cyan());
        }
    }
}
