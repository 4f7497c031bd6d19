//! hms-push-cli: fetch an access token or send a test notification.
//!
//! Usage:
//!   hms-push-cli token                                   Fetch and print token metadata
//!   hms-push-cli send --token <device> [--title <t>] [--body <b>] [--dry-run]
//!
//! Credentials come from HMS_APP_ID / HMS_APP_SECRET (or the OS keyring).

use anyhow::{bail, Context};
use hms_push::{HmsClient, HmsClientBuilder, PushMessage};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "token" => cmd_token().await,
        "send" => cmd_send(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"hms-push-cli: HUAWEI Push Kit command-line tool

USAGE:
    hms-push-cli <COMMAND> [OPTIONS]

COMMANDS:
    token                           Fetch an access token and print its metadata
    send --token <device>           Send a notification to one device
         [--title <text>]           Notification title (default "Test")
         [--body <text>]            Notification body (default "Hello from hms-push-cli")
         [--dry-run]                Ask the provider to validate only
    version                         Show version information
    help                            Show this help message

ENVIRONMENT:
    HMS_APP_ID                      App id (required)
    HMS_APP_SECRET                  App secret (falls back to keyring service "hms-push")
    HMS_RETRY_TIMES                 Attempts per request (default 5)
    HMS_RETRY_INTERVAL_MS           Pause between attempts (default 0)
    HMS_HTTP_TIMEOUT_SECS           Per-attempt HTTP timeout (default 30)
    HMS_PROXY_URL                   HTTP(S) proxy
    RUST_LOG                        Log filter, e.g. hms_push=debug"#
    );
}

fn cmd_version() {
    println!("hms-push-cli {}", env!("CARGO_PKG_VERSION"));
}

fn build_client() -> anyhow::Result<HmsClient> {
    HmsClientBuilder::from_env()
        .build()
        .context("cannot build client (set HMS_APP_ID and HMS_APP_SECRET)")
}

async fn cmd_token() -> anyhow::Result<()> {
    let client = build_client()?;
    let token = client.refresh_token(&CancellationToken::new()).await?;
    println!("app_id:     {}", client.app_id());
    println!("expires_in: {}", token.expires_in.map_or("-".to_string(), |s| format!("{s}s")));
    println!("scope:      {}", token.scope.as_deref().unwrap_or("-"));
    Ok(())
}

struct SendArgs {
    token: String,
    title: String,
    body: String,
    dry_run: bool,
}

fn parse_send_args(args: &[String]) -> anyhow::Result<SendArgs> {
    let mut token = None;
    let mut title = "Test".to_string();
    let mut body = "Hello from hms-push-cli".to_string();
    let mut dry_run = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--token" => token = iter.next().cloned(),
            "--title" => title = iter.next().cloned().context("--title needs a value")?,
            "--body" => body = iter.next().cloned().context("--body needs a value")?,
            "--dry-run" => dry_run = true,
            other => bail!("unknown option for send: {other}"),
        }
    }

    let token = token.filter(|t| !t.is_empty()).context("--token <device> is required")?;
    Ok(SendArgs {
        token,
        title,
        body,
        dry_run,
    })
}

async fn cmd_send(args: &[String]) -> anyhow::Result<()> {
    let args = parse_send_args(args)?;
    let client = build_client()?;

    let msg = PushMessage::android_notification(vec![args.token], args.title, args.body)
        .dry_run(args.dry_run);

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let resp = client.send_message(&msg, &cancel).await;
    ctrl_c.abort();
    let resp = resp?;

    println!("code:       {}", resp.code);
    println!("msg:        {}", resp.msg);
    println!("request_id: {}", resp.request_id);
    if let Some(rc) = resp.result_code() {
        println!("meaning:    {}", rc.description());
    }
    if !resp.is_success() {
        bail!("provider returned code {}", resp.code);
    }
    Ok(())
}
