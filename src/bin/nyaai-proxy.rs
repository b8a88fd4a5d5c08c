//! Credential-holding proxy for NyaAI front-ends.
//!
//! # Usage
//!
//! ```bash
//! NYAAI_API_KEY=... nyaai-proxy
//! NYAAI_API_KEY=... nyaai-proxy --bind 0.0.0.0:8787 --model llama-3.3-70b-versatile
//! ```

use arrrg::CommandLine;

use nyaai::proxy::{ProxyArgs, ProxyConfig, ProxyServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let (args, free) = ProxyArgs::from_command_line_relaxed("nyaai-proxy [OPTIONS]");
    if !free.is_empty() {
        eprintln!("command takes no positional arguments");
        std::process::exit(1);
    }
    let config = ProxyConfig::from_args(args)?;
    let server = ProxyServer::start(&config).await?;
    println!("nyaai-proxy listening on http://{}/v1", server.addr());

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");
    server.shutdown();
    Ok(())
}
