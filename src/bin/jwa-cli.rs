use clap::Parser;
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "jwa-cli")]
#[command(about = "Send a message to a JWA server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: Url,

    #[arg(short, long, default_value = "/")]
    prefix: String,

    /// Message name, e.g. `echo`
    name: String,

    /// JSON payload
    #[arg(default_value = "{}")]
    payload: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let payload: Value = serde_json::from_str(&cli.payload)?;
    let endpoint = message_url(&cli.url, &cli.prefix, &cli.name)?;

    let res = reqwest::Client::new()
        .post(endpoint.clone())
        .json(&payload)
        .send()
        .await?;

    println!("POST {} -> {}", endpoint, res.status());
    print_response(res).await
}

fn message_url(base: &Url, prefix: &str, name: &str) -> Result<Url, url::ParseError> {
    let prefix = prefix.trim_matches('/');
    let path = if prefix.is_empty() {
        format!("/{name}")
    } else {
        format!("/{prefix}/{name}")
    };
    base.join(&path)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let text = res.text().await?;
    if text.is_empty() {
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
