use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Management CLI for the subdomain proxy routes", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    /// Admin API key, if the proxy requires one.
    #[arg(short, long, env = "PROXY_ADMIN_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy status
    Status,
    /// List all routes
    List,
    /// Register a new route
    Create {
        name: String,
        url: String,
    },
    /// Change fields of an existing route
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove a route
    Delete {
        id: String,
    },
    /// Reload the routing table from the store
    Reload,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", base)),
        Commands::List => client.get(format!("{}/route", base)),
        Commands::Create { name, url } => client
            .post(format!("{}/route", base))
            .json(&json!({ "name": name, "url": url })),
        Commands::Update { id, name, url, active } => {
            let mut body = Map::new();
            if let Some(name) = name {
                body.insert("name".into(), Value::String(name));
            }
            if let Some(url) = url {
                body.insert("url".into(), Value::String(url));
            }
            if let Some(active) = active {
                body.insert("isActive".into(), Value::Bool(active));
            }
            client.put(format!("{}/route/{}", base, id)).json(&Value::Object(body))
        }
        Commands::Delete { id } => client.delete(format!("{}/route/{}", base, id)),
        Commands::Reload => client.post(format!("{}/route/reload", base)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
