//! ESC-M CLI: run the dashboard stages against a local supplier CSV
//!
//! Uses the same stage logic as the dashboard server, with one session per
//! invocation.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use escm::view::{Dashboard, REPORTS_NEED_NARRATIVE};
use escm::{AppConfig, SessionContext};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "escm-cli", version, about = "Ethical Supply Chain Mapper CLI")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a supplier CSV and print each supplier's risk tier
    Score {
        /// Supplier CSV (semicolon-delimited, two preamble lines)
        path: PathBuf,
    },
    /// Render the multi-tier supply graph as SVG
    Graph {
        path: PathBuf,

        /// Output SVG file
        #[arg(long, default_value = "escm_graph.svg")]
        out: PathBuf,
    },
    /// Query the sanctions and news APIs for every supplier
    Alerts { path: PathBuf },
    /// Show one supplier's details, recommendation and AI prompt
    Insights {
        path: PathBuf,

        /// Supplier id (defaults to the first row)
        #[arg(long)]
        id: Option<String>,
    },
    /// Write the compliance report and raw-data export
    Report {
        path: PathBuf,

        #[arg(long, default_value = "escm_compliance_report.pdf")]
        pdf: PathBuf,

        #[arg(long, default_value = "escm_data.csv")]
        csv: PathBuf,

        /// Generate an AI narrative for this supplier first (repeatable)
        #[arg(long = "generate")]
        generate: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let dashboard = Dashboard::from_config(&config)?;
    let mut session = SessionContext::new();

    match cli.command {
        Commands::Score { path } => {
            load(&dashboard, &mut session, &path)?;
            print_scores(&session, &cli.format)
        }
        Commands::Graph { path, out } => {
            load(&dashboard, &mut session, &path)?;
            let view = dashboard.graph(&session)?;
            std::fs::write(&out, &view.svg)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "Wrote {} ({} nodes, {} edges)",
                out.display(),
                view.nodes.len(),
                view.edges.len()
            );
            Ok(())
        }
        Commands::Alerts { path } => {
            load(&dashboard, &mut session, &path)?;
            let view = dashboard.alerts(&session).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                OutputFormat::Table => {
                    let mut table = Table::new();
                    table.set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec!["Supplier", "Level", "Message"]);
                    for alert in view.risk_flags.iter().chain(view.alerts.iter()) {
                        table.add_row(vec![
                            alert.supplier_id.clone(),
                            format!("{:?}", alert.level),
                            alert.message.clone(),
                        ]);
                    }
                    println!("{}", table);
                }
            }
            Ok(())
        }
        Commands::Insights { path, id } => {
            load(&dashboard, &mut session, &path)?;
            let view = dashboard.insights(&session, id.as_deref())?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                OutputFormat::Table => {
                    let mut table = Table::new();
                    table.set_header(vec!["Field", "Value"]);
                    for (field, value) in &view.details {
                        table.add_row(vec![field.clone(), value.to_string()]);
                    }
                    println!("{}", table);
                    println!("{}", view.recommendation);
                    println!("\nPrompt:\n{}", view.prompt);
                }
            }
            Ok(())
        }
        Commands::Report {
            path,
            pdf,
            csv,
            generate,
        } => {
            load(&dashboard, &mut session, &path)?;
            for id in &generate {
                let narrative = dashboard.generate_and_store(&mut session, id).await?;
                println!("Generated AI report for {}", narrative.supplier_id);
            }
            write_reports(&session, &pdf, &csv)
        }
    }
}

fn load(dashboard: &Dashboard, session: &mut SessionContext, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    dashboard.upload(session, &bytes)?;
    Ok(())
}

fn print_scores(session: &SessionContext, format: &OutputFormat) -> anyhow::Result<()> {
    let Some(table) = session.table() else {
        return Ok(());
    };
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = table
                .risk_pairs()
                .into_iter()
                .map(|(id, risk)| serde_json::json!({ "id": id, "Predicted_Risk": risk }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let mut out = Table::new();
            out.set_content_arrangement(ContentArrangement::Dynamic);
            out.set_header(vec!["id", "Predicted_Risk"]);
            for (id, risk) in table.risk_pairs() {
                out.add_row(vec![id, risk.map(|r| r.to_string()).unwrap_or_default()]);
            }
            println!("{}", out);
            println!("{} supplier(s)", table.len());
        }
    }
    Ok(())
}

/// The PDF always lists every supplier; unlike the dashboard, the CLI does
/// not require a narrative before writing it.
fn write_reports(
    session: &SessionContext,
    pdf: &Path,
    csv: &Path,
) -> anyhow::Result<()> {
    let table = session.table().context("no supplier table loaded")?;
    let report = escm::ComplianceReport::new(table, session.reports());
    std::fs::write(pdf, report.to_pdf()).with_context(|| format!("failed to write {}", pdf.display()))?;
    let data = escm::report::export_csv(table, b';')?;
    std::fs::write(csv, data).with_context(|| format!("failed to write {}", csv.display()))?;

    let narratives = report.sections.iter().filter(|s| s.has_narrative).count();
    println!(
        "Wrote {} ({} sections, {} with AI narrative) and {}",
        pdf.display(),
        report.sections.len(),
        narratives,
        csv.display()
    );
    if session.reports().is_empty() {
        println!("Note: {}", REPORTS_NEED_NARRATIVE);
    }
    Ok(())
}
