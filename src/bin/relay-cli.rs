use clap::{Parser, Subcommand};
use cors_relay::http::{X_PROXY_BY, X_TARGET_STATUS, X_TARGET_URL};
use cors_relay::{RelayOptions, RelayRequest};
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send requests through a running CORS relay", long_about = None)]
struct Cli {
    /// Relay endpoint.
    #[arg(short, long, default_value = "http://localhost:8080/proxy")]
    relay: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the relay's info document
    Info,
    /// Relay a request to a target URL
    Fetch {
        /// Target URL
        target: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Header as 'Name: value' (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,

        /// Send --data as a JSON value instead of a raw string
        #[arg(long)]
        json: bool,

        /// Upstream timeout in milliseconds (capped by the relay)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Info => {
            let res = client.get(&cli.relay).send().await?;
            print_response(res).await?;
        }
        Commands::Fetch {
            target,
            method,
            headers,
            data,
            json,
            timeout_ms,
        } => {
            let body = match data {
                Some(raw) if json => Some(serde_json::from_str::<Value>(&raw)?),
                Some(raw) => Some(Value::String(raw)),
                None => None,
            };
            let options = RelayOptions {
                method: Some(method),
                headers: Some(parse_headers(&headers)?),
                body,
                timeout_ms,
                ..Default::default()
            };
            let envelope = RelayRequest::new(target).with_options(options);

            let res = client.post(&cli.relay).json(&envelope).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn parse_headers(raw: &[String]) -> Result<Map<String, Value>, String> {
    let mut headers = Map::new();
    for line in raw {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| format!("header '{line}' is not 'Name: value'"))?;
        headers.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
    }
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    eprintln!("Relay status: {}", status);
    for name in [X_PROXY_BY, X_TARGET_URL, X_TARGET_STATUS] {
        if let Some(value) = res.headers().get(&name) {
            eprintln!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
