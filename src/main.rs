use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use rockauto_client::{ClientConfig, RockAutoClient};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: rockauto-search <make> <year> <model> [category]";

struct Args {
    make: String,
    year: i32,
    model: String,
    category: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let (Some(make), Some(year), Some(model)) = (args.next(), args.next(), args.next()) else {
        bail!(USAGE);
    };
    let year = year
        .parse()
        .with_context(|| format!("year must be a number, got '{year}'"))?;
    let category = args.collect::<Vec<_>>().join(" ");

    Ok(Args {
        make,
        year,
        model,
        category: (!category.is_empty()).then_some(category),
    })
}

async fn run(args: Args) -> Result<()> {
    let client = RockAutoClient::new(ClientConfig::from_env())?;
    let result = search(&client, &args).await;
    client.close().await;
    result
}

async fn search(client: &RockAutoClient, args: &Args) -> Result<()> {
    let vehicle = client.vehicle(&args.make, args.year, &args.model, 0).await?;
    println!("{vehicle}");

    let categories = vehicle.part_categories().await?;
    let Some(wanted) = &args.category else {
        for category in &categories.categories {
            println!("  {}", category.name);
        }
        info!("Listed {} categories", categories.count());
        return Ok(());
    };

    let category = categories
        .find(wanted)
        .with_context(|| format!("no category matching '{wanted}' for {vehicle}"))?;
    let parts = vehicle.parts_by_category(&category.group_name).await?;

    println!("{} ({} parts)", category.name, parts.count());
    for part in &parts.parts {
        println!("  {part}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let outcome = match parse_args() {
        Ok(args) => run(args).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
