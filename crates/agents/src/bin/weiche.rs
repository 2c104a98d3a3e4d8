//! weiche, the operational CLI for the data-product agents.
//!
//! Every subcommand prints its result as pretty JSON, so output can be
//! piped straight into jq or a downstream job.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use weiche_agents::{
    health, target_schema, CustomerProcessor, FieldMapper, SampleDataGenerator,
    UseCaseInterpreter,
};
use weiche_core::{config, Config, DataProduct, RuleSet, Sampler};
use weiche_llm::ModelClient;

// ── CLI ─────────────────────────────────────────────────────────────

/// Route banking use cases onto data-product tracks.
#[derive(Parser, Debug)]
#[command(name = "weiche", version, about)]
struct Cli {
    /// Seed for sampled fallbacks and mock data (reproducible runs).
    #[arg(long, env = "WEICHE_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a use case onto a data product.
    Interpret {
        /// Free-text banking use case.
        use_case: String,
    },
    /// Suggest source-to-target field mappings for a data product.
    Map {
        /// Target data product (customer_360, loan_eligibility, ...).
        product: DataProduct,
        /// Comma-separated source field names.
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Generate a batch of sample customer ids.
    GenerateData {
        product: DataProduct,
        #[arg(long, default_value_t = 10)]
        samples: usize,
    },
    /// Run one customer through mapping, ingestion and certification.
    Process {
        product: DataProduct,
        customer_id: String,
    },
    /// Build and export the JSON and CSV reports for one customer.
    Report {
        product: DataProduct,
        customer_id: String,
    },
    /// List the models the endpoint currently serves.
    Models,
    /// Probe endpoint health.
    Health,
    /// Print the resolved configuration.
    Config,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    config::load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let sampler = Arc::new(match cli.seed {
        Some(seed) => {
            info!(seed, "using seeded sampler");
            Sampler::seeded(seed)
        }
        None => Sampler::from_entropy(),
    });

    let client = Arc::new(ModelClient::from_config(&config).await);

    match cli.command {
        Command::Interpret { use_case } => {
            let interpreter = UseCaseInterpreter::new(
                client,
                RuleSet::banking(),
                config.models.interpret_model.clone(),
                sampler,
            );
            print_json(&interpreter.interpret(&use_case).await?)?;
        }
        Command::Map { product, fields } => {
            let mapper = FieldMapper::new(client, config.models.mapping_model.clone());
            let schema = target_schema(product);
            print_json(&mapper.suggest_mappings(&fields, &schema).await?)?;
        }
        Command::GenerateData { product, samples } => {
            let generator = SampleDataGenerator::new(sampler);
            print_json(&generator.generate(product, samples)?)?;
        }
        Command::Process {
            product,
            customer_id,
        } => {
            let mapper = FieldMapper::new(client, config.models.mapping_model.clone());
            let processor = CustomerProcessor::new(mapper, sampler);
            print_json(&processor.process(product, &customer_id).await?)?;
        }
        Command::Report {
            product,
            customer_id,
        } => {
            let writer = weiche_agents::ReportWriter::new(config.reports.dir.clone(), sampler);
            let model_used = client.current_model().await;
            let report = writer.build(product, &customer_id, model_used.as_deref())?;
            let paths = writer.export(&report).await?;
            print_json(&serde_json::json!({ "report": report, "paths": paths }))?;
        }
        Command::Models => {
            print_json(&client.list_models().await)?;
        }
        Command::Health => {
            print_json(&health(&client).await)?;
        }
        Command::Config => {
            print_json(&config.summary_json())?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
