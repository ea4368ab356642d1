mod input;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use mlengine_client::{CommandToken, EngineConfig, PredictionClient, StaticToken, TokenProvider};
use mlengine_core::{BASE_URL, MAX_PAYLOAD_BYTES, split_by_size};

use crate::input::Format;

#[derive(Parser, Debug)]
#[command(name = "mlengine", version, about = "Online predictions against ML Engine models")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request predictions and print one score vector per instance as JSON.
    Predict {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, env = "MLENGINE_PROJECT")]
        project: String,
        #[arg(long)]
        model: String,
        /// Model version; the model's default version when omitted.
        #[arg(long = "model-version")]
        version: Option<String>,
        /// Service-account key file for the token command.
        #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
        credentials: Option<String>,
        /// Bearer token to use as-is instead of asking gcloud.
        #[arg(long, env = "MLENGINE_TOKEN", hide_env_values = true)]
        token: Option<String>,
        #[arg(long, env = "MLENGINE_BASE_URL", default_value = BASE_URL)]
        base_url: String,
    },
    /// Show how the instances would be split into requests, without sending them.
    Plan {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Instances file.
    #[arg(long, short)]
    input: PathBuf,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    /// Per-request payload ceiling in bytes.
    #[arg(long, default_value_t = MAX_PAYLOAD_BYTES)]
    max_payload_bytes: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("mlengine v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Predict {
            input,
            project,
            model,
            version,
            credentials,
            token,
            base_url,
        } => {
            let instances = input::load(&input.input, input.format)?;
            let config = EngineConfig::default()
                .with_base_url(base_url)
                .with_max_payload_bytes(input.max_payload_bytes);
            let token: Arc<dyn TokenProvider> = match token {
                Some(token) => Arc::new(StaticToken::new(token)),
                None => Arc::new(CommandToken::gcloud(credentials.clone())),
            };

            let mut builder = PredictionClient::builder(project)
                .config(config)
                .token_provider(token);
            if let Some(credentials) = credentials {
                builder = builder.credentials(credentials);
            }
            let client = builder.build();

            let scores = client.predict(&model, instances, version.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        Command::Plan { input } => {
            let batch = input::load(&input.input, input.format)?.normalize()?;
            let total = batch.instances.len();
            let chunks = split_by_size(batch.instances, input.max_payload_bytes)?;
            for (i, chunk) in chunks.iter().enumerate() {
                println!("chunk {i}: {} instances, {} bytes", chunk.len(), chunk.bytes);
            }
            println!(
                "{total} instances in {} request(s), ceiling {} bytes",
                chunks.len(),
                input.max_payload_bytes
            );
        }
    }
    Ok(())
}
