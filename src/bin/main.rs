//! launchpad-wallet CLI - drive the session manager from a terminal
//!
//!   launchpad-wallet initialize --url ws://127.0.0.1:8545   → session from authorized accounts
//!   launchpad-wallet connect --simulate                     → prompt (simulated wallet) then session
//!   launchpad-wallet switch --testnet --simulate            → switch / add chain → {"switched": bool}
//!   launchpad-wallet sign "hello" --simulate                → connect, then personal_sign
//!   launchpad-wallet networks                               → configured network descriptors
//!
//! Without `--url` or `--simulate` no wallet is present, which exercises the
//! "not installed" paths.
//!
//! Configuration:
//!   LAUNCHPAD_WS_URL, LAUNCHPAD_MAINNET_ID, LAUNCHPAD_TESTNET_ID,
//!   LAUNCHPAD_OVERLAP, LAUNCHPAD_TIMEOUT_MS, LAUNCHPAD_LOG_JSON, RUST_LOG

use anyhow::{anyhow, Context, Result};
use launchpad_wallet::logging::init_logging;
use launchpad_wallet::{
    MemoryWallet, Notifier, RecordingNotifier, SessionConfig, SessionManager, Transport, TracingNotifier, WsTransport,
};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEMO_ACCOUNT: &str = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4";

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("launchpad-wallet {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let Some(command) = opts.command.clone() else {
        print_usage();
        return;
    };

    let result = tokio::runtime::Runtime::new()
        .context("tokio runtime")
        .and_then(|rt| rt.block_on(run(&command, &opts)));

    let pretty = opts.pretty || (!opts.json && std::io::stdout().is_terminal());
    let render = |value: &Value| {
        let encoded = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
        encoded.unwrap_or_else(|_| value.to_string())
    };
    match result {
        Ok(output) => println!("{}", render(&output)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{e:#}")})));
            std::process::exit(1);
        }
    }
}

async fn run(command: &str, opts: &ParsedArgs) -> Result<Value> {
    let mut config = SessionConfig::from_env()?;
    if let Some(ms) = opts.timeout_ms {
        config.request_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }

    if command == "networks" {
        return Ok(json!({"target": config.target, "networks": config.networks}));
    }

    let transport = open_transport(opts).await?;
    let notices = RecordingNotifier::new();
    let manager = SessionManager::new(transport, notices.clone(), config);

    let output = match command {
        "initialize" | "init" => json!({"session": manager.initialize().await}),
        "connect" => json!({"session": manager.connect().await}),
        "switch" => json!({"switched": manager.switch_to_configured(opts.testnet).await}),
        "sign" => {
            let message = opts.message.as_deref().ok_or_else(|| anyhow!("sign needs a message"))?;
            let session = manager.connect().await;
            let signer = session.signer().ok_or_else(|| anyhow!("wallet did not authorize an account"))?;
            let signature = signer.sign_message(message).await?;
            json!({"account": signer.address(), "message": message, "signature": signature})
        }
        other => return Err(anyhow!("Unknown command: {}", other)),
    };

    let recorded = notices.take();
    for r in &recorded {
        TracingNotifier.notify(&r.notice);
    }
    let mut output = output;
    output["notices"] = json!(recorded);
    Ok(output)
}

async fn open_transport(opts: &ParsedArgs) -> Result<Option<Transport>> {
    if opts.simulate {
        let wallet = MemoryWallet::new()
            .with_name("simulated")
            .with_accounts([DEMO_ACCOUNT])
            .with_chain(1u64);
        debug!("using simulated wallet");
        let transport: Transport = Arc::new(wallet);
        return Ok(Some(transport));
    }
    match &opts.url {
        Some(url) => {
            let ws = WsTransport::connect(url.clone()).await.with_context(|| format!("connect {url}"))?;
            let transport: Transport = Arc::new(ws);
            Ok(Some(transport))
        }
        None => Ok(None),
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    message: Option<String>,
    url: Option<String>,
    simulate: bool,
    testnet: bool,
    timeout_ms: Option<u64>,
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--json" => opts.json = true,
                "--pretty" => opts.pretty = true,
                "--simulate" | "-s" => opts.simulate = true,
                "--testnet" | "-t" => opts.testnet = true,
                "--url" | "-u" => {
                    if i + 1 < args.len() {
                        opts.url = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--timeout-ms" => {
                    if i + 1 < args.len() {
                        opts.timeout_ms = args[i + 1].parse().ok();
                        i += 1;
                    }
                }
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => {} // Ignore unknown flags
            }
            i += 1;
        }

        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        if !positional.is_empty() {
            opts.message = Some(positional.join(" "));
        }

        if opts.url.is_none() {
            opts.url = env::var("LAUNCHPAD_WS_URL").ok().filter(|s| !s.is_empty());
        }

        opts
    }
}

fn print_usage() {
    println!(
        r#"launchpad-wallet - wallet session manager

USAGE:
    launchpad-wallet <command> [message] [options]

COMMANDS:
    initialize              Session from already-authorized accounts (no prompt)
    connect                 Request accounts, then initialize
    switch                  Switch the wallet to the configured network (adds it if unknown)
    sign <message>          personal_sign with the session account
    networks                Print configured network descriptors

WALLET OPTIONS:
    --url, -u <ws-url>      JSON-RPC WebSocket endpoint (env: LAUNCHPAD_WS_URL)
    --simulate, -s          Use an in-memory wallet with a demo account
    --testnet, -t           Target the testnet id when switching
    --timeout-ms <ms>       Per-request timeout (env: LAUNCHPAD_TIMEOUT_MS, 0 = none)

OUTPUT OPTIONS:
    --json                  Compact JSON
    --pretty                Pretty JSON (default on a tty)
    --help, -h              This help
    --version, -V           Version"#
    );
}
