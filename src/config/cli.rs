use crate::config::toml_config::StorefrontConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "storefront")]
#[command(about = "Cart badge, cart actions and voice ordering for the storefront backend")]
pub struct Cli {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Storefront base URL (overrides the config file)")]
    pub base_url: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the number of items in the cart
    Count,
    /// Add a product to the cart
    Add {
        product_id: String,
        #[arg(long, short, default_value = "1")]
        quantity: u32,
    },
    /// Change the quantity of a cart line (0 removes it)
    Update { product_id: String, quantity: u32 },
    /// Remove a product from the cart
    Remove { product_id: String },
    /// Place an order by voice
    Voice {
        #[arg(long, help = "Use this text instead of listening on stdin")]
        transcript: Option<String>,
    },
}

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

impl Cli {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn storefront_config(&self) -> Result<StorefrontConfig> {
        let mut config = match &self.config {
            Some(path) => StorefrontConfig::from_file(path)?,
            None => StorefrontConfig::with_base_url(DEFAULT_BASE_URL),
        };

        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }

        Ok(config)
    }
}
