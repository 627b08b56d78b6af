use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser)]
#[command(name = "callgate-cli")]
#[command(about = "Client for callgate calls and admin streams", long_about = None)]
struct Cli {
    /// Server address, host:port.
    #[arg(short, long, default_value = "127.0.0.1:8082")]
    addr: String,

    /// Consumer identity sent with every call.
    #[arg(short, long)]
    consumer: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make a unary call, e.g. `call biz/Check`
    Call { method: String },
    /// Follow the live call log
    Logs,
    /// Follow aggregated statistics
    Stats {
        /// Flush interval in seconds.
        #[arg(short, long, default_value_t = 1)]
        interval: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Call { method } => {
            let res = reqwest::Client::new()
                .post(format!("http://{}/{}", cli.addr, method.trim_start_matches('/')))
                .header("consumer", &cli.consumer)
                .json(&serde_json::json!({}))
                .send()
                .await?;
            let status = res.status();
            let body = res.text().await?;
            if status.is_success() {
                println!("{}", body);
            } else {
                eprintln!("Error: call returned status {}", status);
                eprintln!("Response: {}", body);
            }
        }
        Commands::Logs => {
            follow(&cli, format!("ws://{}/admin/Logging", cli.addr)).await?;
        }
        Commands::Stats { interval } => {
            follow(
                &cli,
                format!("ws://{}/admin/Statistics?interval_seconds={}", cli.addr, interval),
            )
            .await?;
        }
    }

    Ok(())
}

/// Print every text frame of a stream as one JSON line.
async fn follow(cli: &Cli, url: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = url.into_client_request()?;
    request
        .headers_mut()
        .insert("consumer", HeaderValue::from_str(&cli.consumer)?);

    let (mut stream, _) = tokio_tungstenite::connect_async(request).await?;
    while let Some(msg) = stream.next().await {
        match msg? {
            Message::Text(text) => println!("{}", text.as_str()),
            Message::Close(frame) => {
                if let Some(frame) = frame {
                    eprintln!("Stream closed: {}", frame.reason.as_str());
                }
                break;
            }
            _ => {}
        }
    }
    Ok(())
}
