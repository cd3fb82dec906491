use clap::{Parser, Subcommand};
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "todo-cli")]
#[command(about = "Command-line client for the todo service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Ping,
    /// Fetch a fresh bearer token
    Token,
    /// Create a todo
    Create {
        /// Todo text
        text: String,

        /// Bearer token; fetched from /tokenz when omitted
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{}/ping", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Token => {
            let res = client.get(format!("{}/tokenz", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Create { text, token } => {
            let token = match token {
                Some(token) => token,
                None => fetch_token(&client, &cli.url).await?,
            };
            let res = client
                .post(format!("{}/todos", cli.url))
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .json(&json!({ "text": text }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn fetch_token(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let body: Value = client
        .get(format!("{url}/tokenz"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    body.get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "token missing from /tokenz response".into())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: service returned status {status}");
        if !text.is_empty() {
            eprintln!("{text}");
        }
        return Err(format!("request failed with {status}").into());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
