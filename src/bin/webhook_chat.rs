#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use anyhow::{bail, Context, Result};
#[cfg(not(target_arch = "wasm32"))]
use clap::{Parser, Subcommand};
#[cfg(not(target_arch = "wasm32"))]
use webhook_chat::{
    api::WebhookClient,
    client_info::ClientInfo,
    config::Config,
    db::WebhookDb,
    storage::{FileStore, LocalPersistence},
    types::{AudioClip, ChatMessage},
};

#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[clap(version, about = "Send chat messages to a webhook and keep the history locally.")]
struct CliArgs {
    /// Directory for history, categories and the webhook database
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Subcommand, Debug)]
enum Command {
    /// Read or change the webhook URL
    Url {
        #[clap(subcommand)]
        action: UrlAction,
    },
    /// Post a message to the webhook and record it in history
    Send {
        text: String,
        /// Audio file to attach (sent as audio.mp3)
        #[clap(short, long)]
        audio: Option<PathBuf>,
        /// Read the URL from the database instead of the key-value store
        #[clap(long)]
        structured: bool,
    },
    /// Print the stored chat history
    History,
    /// List or add category labels
    Categories {
        #[clap(subcommand)]
        action: CategoryAction,
    },
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Subcommand, Debug)]
enum UrlAction {
    Set {
        url: String,
        #[clap(long)]
        structured: bool,
    },
    Show {
        #[clap(long)]
        structured: bool,
    },
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Subcommand, Debug)]
enum CategoryAction {
    List,
    Add { label: String },
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    webhook_chat::logging::init();
    let args = CliArgs::parse();

    let mut config = Config::from_env();
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }

    let local = LocalPersistence::new(FileStore::new(&config.data_dir));
    let db = WebhookDb::new(&config.data_dir);

    match args.command {
        Command::Url { action: UrlAction::Set { url, structured } } => {
            if structured {
                db.save(&url).await?;
            } else if !local.save_webhook_url(&url).is_stored() {
                bail!("Could not store the webhook URL in {}", config.data_dir.display());
            }
            println!("Webhook URL saved.");
        }
        Command::Url { action: UrlAction::Show { structured } } => {
            let url = if structured {
                db.load().await?.unwrap_or_default()
            } else {
                local.load_webhook_url()
            };
            if url.is_empty() {
                println!("(not set)");
            } else {
                println!("{}", url);
            }
        }
        Command::Send { text, audio, structured } => {
            let url = if structured {
                db.load().await?.unwrap_or_default()
            } else {
                local.load_webhook_url()
            };

            let mut message = ChatMessage::new(text, &ClientInfo::current());
            if let Some(path) = audio {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("Error reading audio file: {}", path.display()))?;
                message = message.with_audio(AudioClip::new(bytes));
            }

            let response = WebhookClient::new(&config).send(&url, &message).await?;
            println!("Delivered (HTTP {})", response.status);
            if !response.body.is_empty() {
                println!("{}", response.body);
            }
            local.append_message(message);
        }
        Command::History => {
            for message in local.load_messages() {
                let audio = if message.audio_attached { " [audio]" } else { "" };
                println!(
                    "{}\t{}/{}{}\t{}",
                    message.timestamp, message.os, message.browser, audio, message.text
                );
            }
        }
        Command::Categories { action: CategoryAction::List } => {
            for category in local.load_categories() {
                println!("{}", category);
            }
        }
        Command::Categories { action: CategoryAction::Add { label } } => {
            if !local.add_category(&label).is_stored() {
                bail!("Could not store categories in {}", config.data_dir.display());
            }
        }
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
