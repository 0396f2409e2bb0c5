//! lmstudio binary entry point

use color_eyre::Result;
use tokio_util::sync::CancellationToken;
use lmstudio_rs::{
    cli::{Cli, Commands},
    config,
    ChatOptions, LmStudioClient, Message, RequestContext, Vendor,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("lmstudio_rs=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let env_file = cli
        .env_file
        .clone()
        .unwrap_or_else(config::default_env_file_path);
    config::load_env_file(&env_file)?;

    let mut client = LmStudioClient::new();
    client.apply_env();
    if let Some(base_url) = &cli.base_url {
        client.set_base_url(base_url.clone());
    }
    client.setup()?;

    // Ctrl-C aborts the in-flight request
    let interrupt = CancellationToken::new();
    let mut ctx = RequestContext::with_token(interrupt.clone());
    if let Some(timeout) = cli.request_timeout() {
        ctx = ctx.timeout(timeout);
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Models => {
            for model in client.list_models().await? {
                println!("{model}");
            }
        }
        Commands::Chat {
            model,
            system,
            prompt,
        } => {
            let mut messages = Vec::new();
            if let Some(system) = system {
                messages.push(Message::system(system));
            }
            messages.push(Message::user(prompt));

            let reply = client
                .send(&ctx, &messages, &ChatOptions::for_model(model))
                .await?;
            println!("{reply}");
        }
        Commands::Complete { model, prompt } => {
            let text = client
                .complete(&ctx, &prompt, &ChatOptions::for_model(model))
                .await?;
            println!("{text}");
        }
        Commands::Embed { model, input } => {
            let embedding = client
                .embeddings(&ctx, &input, &ChatOptions::for_model(model))
                .await?;
            println!("{}", serde_json::to_string(&embedding)?);
        }
        Commands::Setup => {
            config::save_env_file(&env_file, &[&client])?;
            println!("Saved {} settings to {}", client.name(), env_file.display());
        }
    }

    Ok(())
}
