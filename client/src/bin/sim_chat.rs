use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use client::auth::{AuthService, Credentials, UserRole};
use client::config::ClientConfig;
use client::connection::ChatConnection;
use client::storage::{FileStore, KeyValueStore};

#[derive(Debug, Clone)]
struct SimConfig {
    config_path: Option<String>,
    store_path: String,
    role: UserRole,
    username: String,
    password: String,
    remember: bool,
    message: Option<String>,
    target_ip: Option<String>,
    listen_ms: u64,
    skip_connect: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development)
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("client/.env").ok();
    }

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cfg = parse_args()?;

    println!("[sim-chat] starting simulation");
    println!("[sim-chat] protocol version: {}", protocol::protocol_version());

    let client_config = match &cfg.config_path {
        Some(path) => ClientConfig::load_from_file(path)
            .with_context(|| format!("failed to load client config from '{}'", path))?,
        None => ClientConfig::default(),
    };

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&cfg.store_path));
    let auth = AuthService::new(store);

    if let Some(remembered) = auth.remembered_login() {
        println!(
            "[sim-chat] remembered login found: {} ({})",
            remembered.username, remembered.role
        );
    }

    println!("[sim-chat] logging in as {} ({})", cfg.username, cfg.role);
    let login = auth
        .login(&Credentials {
            role: cfg.role,
            username: cfg.username.clone(),
            password: cfg.password.clone(),
            remember: cfg.remember,
        })
        .await;

    if !login.success {
        bail!("login failed: {}", login.message);
    }
    let user = login
        .user
        .ok_or_else(|| anyhow!("login succeeded without an identity"))?;
    println!("[sim-chat] login OK: id={} name='{}'", user.id, user.name);

    if cfg.skip_connect {
        println!("[sim-chat] simulation finished (connect skipped)");
        return Ok(());
    }

    let connection = ChatConnection::new(client_config.endpoint.clone(), client_config.reconnect);

    connection.on_connection(|connected| {
        println!(
            "[sim-chat] connectivity: {}",
            if connected { "online" } else { "offline" }
        );
    });
    connection.on_message(|message| {
        println!(
            "[sim-chat] <- [{:?}] {} (from {})",
            message.message_type, message.content, message.from_ip
        );
    });

    println!(
        "[sim-chat] connecting to {}",
        client_config.endpoint.ws_url()
    );
    connection
        .connect(user)
        .await
        .context("failed to open the chat channel")?;

    if let Some(message) = &cfg.message {
        connection.send_message(message, cfg.target_ip.as_deref());
        println!("[sim-chat] -> {}", message);
    }

    println!("[sim-chat] listening for {} ms", cfg.listen_ms);
    tokio::time::sleep(Duration::from_millis(cfg.listen_ms)).await;

    connection.disconnect();
    println!("[sim-chat] simulation finished");
    Ok(())
}

fn parse_args() -> anyhow::Result<SimConfig> {
    let mut cfg = SimConfig {
        config_path: None,
        store_path: ".sim-chat/store.json".to_string(),
        role: UserRole::Primary,
        username: "primary001".to_string(),
        password: "primary123".to_string(),
        remember: false,
        message: Some("hello from sim-chat".to_string()),
        target_ip: None,
        listen_ms: 5_000,
        skip_connect: false,
    };

    let mut args = std::env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => cfg.config_path = Some(next_arg_value(&mut args, &arg)?),
            "--store" => cfg.store_path = next_arg_value(&mut args, &arg)?,
            "--role" => {
                let value = next_arg_value(&mut args, &arg)?;
                cfg.role = match value.as_str() {
                    "primary" => UserRole::Primary,
                    "secondary" => UserRole::Secondary,
                    other => bail!("invalid --role: {} (expected primary|secondary)", other),
                };
            }
            "--username" => cfg.username = next_arg_value(&mut args, &arg)?,
            "--password" => cfg.password = next_arg_value(&mut args, &arg)?,
            "--remember" => cfg.remember = true,
            "--message" => cfg.message = Some(next_arg_value(&mut args, &arg)?),
            "--no-message" => cfg.message = None,
            "--target-ip" => cfg.target_ip = Some(next_arg_value(&mut args, &arg)?),
            "--listen-ms" => {
                let value = next_arg_value(&mut args, &arg)?;
                cfg.listen_ms = value
                    .parse::<u64>()
                    .with_context(|| format!("invalid --listen-ms: {}", value))?;
            }
            "--skip-connect" => cfg.skip_connect = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                bail!("unknown argument: {}\nUse --help to list options.", other);
            }
        }
    }

    Ok(cfg)
}

fn next_arg_value<I>(args: &mut std::iter::Peekable<I>, flag: &str) -> anyhow::Result<String>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| anyhow!("missing value for {}", flag))
}

fn print_help() {
    println!(
        "sim-chat - client simulator for the mock login + chat channel\n\n\
Usage:\n\
  cargo run --manifest-path client/Cargo.toml --bin sim-chat -- [options]\n\n\
Options:\n\
  --config <path>        Client config TOML (default: built-in defaults)\n\
  --store <path>         Key-value store file (default: .sim-chat/store.json)\n\
  --role <role>          Login role: primary|secondary (default: primary)\n\
  --username <user>      Username (default: primary001)\n\
  --password <pass>      Password (default: primary123)\n\
  --remember             Persist the remembered-login record\n\
  --message <text>       Text to send after connecting\n\
  --no-message           Do not send anything after connecting\n\
  --target-ip <ip>       Address the message to a single peer\n\
  --listen-ms <ms>       How long to listen for inbound traffic (default: 5000)\n\
  --skip-connect         Exercise the login flow only\n\
  --help                 Show this help\n"
    );
}
