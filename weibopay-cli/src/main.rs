//! Weibo Pay CLI
//!
//! Command-line interface for signing, verifying and calling the Weibo Pay
//! merchant API.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "weibopay")]
#[command(about = "Weibo Pay CLI - sign, verify and call the Weibo merchant payment API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Merchant config file (defaults to weibopay/merchant.json in the user config directory,
    /// then to WEIBOPAY_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a merchant config file
    Init {
        /// Merchant application key
        #[arg(long)]
        appkey: Option<String>,

        /// Merchant seller id
        #[arg(long)]
        seller_id: Option<String>,

        /// Merchant private key: PEM text, a .pem path or a bare base64 body
        #[arg(long)]
        private_key: Option<String>,

        /// Provider public key: PEM text, a .pem path or a bare base64 body
        #[arg(long)]
        public_key: Option<String>,

        /// Asynchronous notification URL
        #[arg(long)]
        notify_url: Option<String>,

        /// Browser return URL
        #[arg(long)]
        return_url: Option<String>,

        /// API base URI
        #[arg(long)]
        base_uri: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the active merchant config (keys redacted)
    Config,

    /// Print the canonical signing string of key=value fields
    Canonical {
        /// Fields as key=value
        fields: Vec<String>,

        /// Read fields from a form-encoded string instead
        #[arg(long)]
        form: Option<String>,
    },

    /// Sign key=value fields with the merchant key
    Sign {
        /// Fields as key=value
        fields: Vec<String>,

        /// Read fields from a form-encoded string instead
        #[arg(long)]
        form: Option<String>,

        /// Print the signed payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify a notification with the provider public key
    Verify {
        /// Form-encoded notification body
        #[arg(long)]
        form: Option<String>,

        /// Notification query string
        #[arg(long)]
        query: Option<String>,

        /// Print the acknowledgment body on success
        #[arg(long)]
        ack: bool,
    },

    /// Pay through a sub-gateway (web, transfer_confirm)
    Pay {
        /// Gateway name
        gateway: String,

        /// Order fields as key=value
        fields: Vec<String>,

        /// Render the checkout URL as a QR code
        #[arg(long)]
        qr: bool,
    },

    /// Look up an order, refund or transfer
    Find {
        /// Order id, or key=value fields
        order: Vec<String>,

        /// Gateway name (web, refund, transfer_confirm)
        #[arg(short, long, default_value = "web")]
        gateway: String,
    },

    /// Apply for a refund
    Refund {
        /// Refund fields as key=value (pay_id, out_refund_id, notify_url, detail_data)
        fields: Vec<String>,
    },

    /// Print the notification acknowledgment body
    Ack,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("weibopay=debug,weibopay_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("weibopay=info,weibopay_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.unwrap_or_else(commands::default_config_path);

    // Dispatch commands
    match cli.command {
        Commands::Init {
            appkey,
            seller_id,
            private_key,
            public_key,
            notify_url,
            return_url,
            base_uri,
            force,
        } => {
            let options = commands::config::InitOptions {
                appkey,
                seller_id,
                private_key,
                public_key,
                notify_url,
                return_url,
                base_uri,
                force,
            };
            commands::config::init(&config_path, options, cli.verbose)?;
        }
        Commands::Config => {
            commands::config::show(&config_path, cli.verbose)?;
        }
        Commands::Canonical { fields, form } => {
            commands::signing::canonical(&fields, form.as_deref())?;
        }
        Commands::Sign { fields, form, json } => {
            commands::signing::sign(&config_path, &fields, form.as_deref(), json, cli.verbose)?;
        }
        Commands::Verify { form, query, ack } => {
            commands::signing::verify(
                &config_path,
                form.as_deref(),
                query.as_deref(),
                ack,
                cli.verbose,
            )?;
        }
        Commands::Pay {
            gateway,
            fields,
            qr,
        } => {
            commands::gateway::pay(&config_path, &gateway, &fields, qr, cli.verbose).await?;
        }
        Commands::Find { order, gateway } => {
            commands::gateway::find(&config_path, &order, &gateway, cli.verbose).await?;
        }
        Commands::Refund { fields } => {
            commands::gateway::refund(&config_path, &fields, cli.verbose).await?;
        }
        Commands::Ack => {
            print!("{}", weibopay_lib::NOTIFY_ACK);
        }
    }

    Ok(())
}
