use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{render, FormController, HttpGatewayClient, SubmissionState};
use shared::domain::Indicator;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Submit financial indicators to the bankruptcy prediction gateway")]
struct Args {
    #[arg(long, env = "GATEWAY_URL", default_value = "http://127.0.0.1:3000")]
    gateway_url: String,
    /// Decision threshold forwarded to the model.
    #[arg(long)]
    threshold: Option<f64>,
    /// Indicator value, e.g. `--field indice_endividamento=0.42`. Repeatable.
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
    fields: Vec<(Indicator, String)>,
    /// Prompt on stdin for every indicator not given with --field.
    #[arg(long)]
    interactive: bool,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
    /// Print the indicator names and exit.
    #[arg(long)]
    list: bool,
}

fn parse_field(raw: &str) -> Result<(Indicator, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let indicator = name.parse::<Indicator>().map_err(|err| err.to_string())?;
    Ok((indicator, value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    if args.list {
        for indicator in Indicator::ALL {
            println!("{:<45} {}", indicator.wire_name(), indicator.label());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let client =
        HttpGatewayClient::with_timeout(&args.gateway_url, Duration::from_secs(args.timeout_secs))?
            .with_threshold(args.threshold);
    info!(url = %client.predict_url(), "using prediction gateway");
    let mut controller = FormController::new(client);

    for (indicator, value) in args.fields {
        controller.update_field(indicator, value);
    }
    if args.interactive {
        prompt_missing(&mut controller)?;
    }

    controller.submit();
    if controller.state().is_loading() {
        for line in render(controller.state()) {
            eprintln!("{line}");
        }
    }

    let state = controller.settle().await;
    for line in render(state) {
        println!("{line}");
    }

    Ok(match state {
        SubmissionState::Failed(_) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn prompt_missing(controller: &mut FormController<HttpGatewayClient>) -> Result<()> {
    let missing: Vec<Indicator> = controller.fields().unset().collect();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    for indicator in missing {
        print!("{}: ", indicator.label());
        io::stdout().flush().context("failed to flush prompt")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read from stdin")?;
        controller.update_field(indicator, line.trim());
    }
    Ok(())
}
