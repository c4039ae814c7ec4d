use anyhow::{anyhow, Context, Result};
use meal_calorie_detector::cli::{parse_args, register_session};
use meal_calorie_detector::detection_gateway::RoboflowGateway;
use meal_calorie_detector::logging::init_logging;
use meal_calorie_detector::nutrition::{load_nutrition_table, NutritionTable};
use meal_calorie_detector::session::Session;
use std::io::{self, IsTerminal};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env file for API keys

    let cli = parse_args();
    init_logging(cli.verbose)?;

    let table = match &cli.nutrition_table {
        Some(path) => load_nutrition_table(path)
            .with_context(|| format!("Failed to load nutrition table from '{}'", path.display()))?,
        None => NutritionTable::builtin(),
    };

    let mut session = Session::new(table);
    {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        let mut input = stdin.lock();
        // With --json, stdout carries only the reports.
        if cli.json {
            register_session(&mut session, &cli, interactive, &mut input, &mut io::stderr())?;
        } else {
            register_session(&mut session, &cli, interactive, &mut input, &mut io::stdout())?;
        }
    }

    let gateway = RoboflowGateway::new(cli.gateway.to_config())
        .context("Failed to build detection client")?;

    let mut failures = 0;
    for image_path in &cli.images {
        if !cli.json {
            println!("\nDetecting calories in {}...", image_path.display());
        }
        match session.process_upload(&gateway, image_path).await {
            Ok(report) => {
                if cli.json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", report.render_text());
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} uploads failed", failures, cli.images.len()));
    }
    Ok(())
}
