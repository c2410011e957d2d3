use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use switchboard_core::IceServerConfig;
use switchboard_server::{DuplicatePolicy, LifecycleConfig, SignalingConfig, SignalingService, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "switchboard", about = "Signaling coordinator for WebRTC calls")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "SWITCHBOARD_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    #[arg(short, long, env = "SWITCHBOARD_PORT", default_value_t = 3000)]
    port: u16,

    /// Participants allowed per room (2 = direct calls).
    #[arg(long, env = "SWITCHBOARD_ROOM_CAPACITY", default_value_t = 2)]
    room_capacity: usize,

    /// Let a reconnecting user take over their previous connection instead
    /// of being rejected.
    #[arg(long, env = "SWITCHBOARD_REPLACE_DUPLICATES")]
    replace_duplicates: bool,

    /// Seconds of silence before a connection is pinged.
    #[arg(
        long,
        env = "SWITCHBOARD_IDLE_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    idle_secs: u64,

    /// Seconds of silence before a connection is dropped.
    #[arg(
        long,
        env = "SWITCHBOARD_DISCONNECT_SECS",
        default_value_t = 90,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    disconnect_secs: u64,

    /// Seconds without activity before a room is closed.
    #[arg(
        long,
        env = "SWITCHBOARD_ROOM_TTL_SECS",
        default_value_t = 600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    room_ttl_secs: u64,

    /// Repeat the flag or separate URLs with commas.
    #[arg(
        long = "stun-url",
        env = "SWITCHBOARD_STUN_URLS",
        value_delimiter = ',',
        default_value = "stun:stun.l.google.com:19302"
    )]
    stun_urls: Vec<String>,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    turn_credential: Option<String>,
}

impl ServeArgs {
    fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    fn into_config(self) -> SignalingConfig {
        let mut ice_servers: Vec<IceServerConfig> = self
            .stun_urls
            .into_iter()
            .map(IceServerConfig::stun)
            .collect();

        if let Some(turn_url) = self.turn_url {
            ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: self.turn_username,
                credential: self.turn_credential,
            });
        }

        SignalingConfig {
            room_capacity: self.room_capacity,
            duplicate_policy: if self.replace_duplicates {
                DuplicatePolicy::Replace
            } else {
                DuplicatePolicy::Reject
            },
            ice_servers,
            lifecycle: LifecycleConfig {
                idle_after: Duration::from_secs(self.idle_secs),
                disconnect_after: Duration::from_secs(self.disconnect_secs),
                room_ttl: Duration::from_secs(self.room_ttl_secs),
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard=info,switchboard_server=info".into()),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let addr = args.addr();
    let config = args.into_config();

    println!("{}", "🚀 Starting Switchboard...".green().bold());
    println!("   📞 Room capacity: {}", config.room_capacity);
    println!("   🧊 ICE servers:   {}", config.ice_servers.len());

    let service = SignalingService::new(config);
    let app = router(service);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Signaling server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Signaling server failed")?;

    println!("{}", "✨ Switchboard stopped.".green().bold());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
