use clap::Parser;
use std::sync::Arc;
use storefront_client::config::Command;
use storefront_client::core::{ProductId, SpeechRecognizer};
use storefront_client::utils::error::ErrorCategory;
use storefront_client::utils::{logger, validation::Validate};
use storefront_client::{
    Cli, ConsoleUi, HttpStorefront, ScriptedRecognizer, Storefront, StorefrontConfig,
    StorefrontError, TerminalRecognizer, ToastNotifier,
};

fn exit_with(e: &StorefrontError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());

    let exit_code = match e.category() {
        ErrorCategory::Usage => 2,
        ErrorCategory::Configuration => 3,
        ErrorCategory::Transport => 4,
        ErrorCategory::CapabilityUnavailable
        | ErrorCategory::Recognition
        | ErrorCategory::Application => 1,
    };
    std::process::exit(exit_code);
}

fn parse_product(raw: &str) -> ProductId {
    match ProductId::new(raw) {
        Some(id) => id,
        None => exit_with(&StorefrontError::Validation {
            message: "product id cannot be empty".to_string(),
        }),
    }
}

async fn run_command<R: SpeechRecognizer>(
    command: Command,
    config: &StorefrontConfig,
    recognizer: R,
) -> storefront_client::Result<()> {
    let api = HttpStorefront::from_config(config)?;
    let ui = Arc::new(ConsoleUi::new(ToastNotifier::new(
        config.toast.auto_hide_ms,
        config.toast.capacity,
    )));
    let storefront = Storefront::new(api, Arc::clone(&ui), recognizer, config.recognition_options());

    match command {
        Command::Count => {
            storefront.badge().refresh().await?;
        }
        Command::Add {
            product_id,
            quantity,
        } => {
            storefront
                .cart()
                .add_to_cart(&parse_product(&product_id), quantity)
                .await?;
        }
        Command::Update {
            product_id,
            quantity,
        } => {
            storefront
                .cart()
                .update_item(&parse_product(&product_id), quantity)
                .await?;
        }
        Command::Remove { product_id } => {
            storefront
                .cart()
                .remove_item(&parse_product(&product_id))
                .await?;
        }
        Command::Voice { .. } => {
            storefront.init().await;
            // Ctrl-C 取消聆聽，已送出的請求不受影響
            storefront
                .voice()
                .start_until(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting storefront CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.storefront_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let result = match &cli.command {
        Command::Voice {
            transcript: Some(text),
        } => {
            let recognizer = ScriptedRecognizer::with_transcript(text.clone());
            run_command(cli.command.clone(), &config, recognizer).await
        }
        _ => run_command(cli.command.clone(), &config, TerminalRecognizer::default()).await,
    };

    if let Err(e) = result {
        exit_with(&e);
    }

    Ok(())
}
