use clap::Parser;
use ecopulse::badge::{save_badge, BadgeFonts, BadgeSpec};
use ecopulse::cli::{Cli, Commands};
use ecopulse::config::Config;
use ecopulse::controller::{Controller, PendingRequest, RunOutcome, View};
use ecopulse::error::Result;
use ecopulse::gateway::{Analyzer, Gateway, GeminiClient};
use ecopulse::input::ImageUpload;
use ecopulse::{interactive, logging, scanner, view};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let controller = Controller::new(build_gateway(&config)?);
            interactive::run(controller, &config).await?;
        }

        Commands::Image { path, barcode } => {
            let upload = ImageUpload::from_path(&path)?;
            let mut controller = Controller::new(build_gateway(&config)?);
            if let Some(code) = barcode {
                controller.session_mut().set_barcode(&code)?;
            }
            let pending = controller.session_mut().begin_image(upload)?;
            analyze_once(&mut controller, pending, cli.json).await?;
        }

        Commands::Url { url } => {
            let mut controller = Controller::new(build_gateway(&config)?);
            let pending = controller.session_mut().begin_url(&url)?;
            analyze_once(&mut controller, pending, cli.json).await?;
        }

        Commands::Barcode { code } => {
            let mut controller = Controller::new(build_gateway(&config)?);
            let pending = controller.session_mut().begin_barcode(&code)?;
            analyze_once(&mut controller, pending, cli.json).await?;
        }

        Commands::Scan => {
            let mut controller = Controller::new(build_gateway(&config)?);
            if !cli.json {
                println!("{}", view::render_scanning());
            }
            match controller.scan(scanner::stdin(), &config.symbologies).await? {
                Some(pending) => analyze_once(&mut controller, pending, cli.json).await?,
                None => println!("⏹ Scan cancelled."),
            }
        }

        Commands::Badge { name, level, output } => {
            println!("🏅 EcoPulse - eco-badge generator\n");
            let spec = BadgeSpec::new(&name, level);
            let fonts = BadgeFonts::load(&config);
            let dir = output.unwrap_or_else(|| config.badge_output_dir());
            match save_badge(&spec, fonts.as_ref(), &dir)? {
                Some(path) => println!("🏅 Badge saved: {}", path.display()),
                None => println!("⚠ The badge could not be drawn."),
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key saved.");
            }

            if show {
                println!("Config: {}", Config::config_path()?.display());
                println!("  Model: {}", config.model);
                println!("  API base URL: {}", config.api_base_url);
                println!("  Temperature: {}", config.temperature);
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Tip interval: {}s", config.tip_interval_seconds);
                println!("  Badge output dir: {}", config.badge_output_dir().display());
                println!(
                    "  Badge font: {}",
                    config
                        .badge_font
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "auto".into())
                );
                let names: Vec<&str> = config.symbologies.iter().map(|s| s.name()).collect();
                println!("  Symbologies: {}", names.join(", "));
                println!("  API key: {}", if config.api_key().is_ok() { "set" } else { "not set" });
            }
        }
    }

    Ok(())
}

fn build_gateway(config: &Config) -> Result<Gateway<GeminiClient>> {
    let client = GeminiClient::from_config(config)?;
    Ok(Gateway::new(client, config.temperature))
}

/// 1回分の解析を実行して結果を表示
async fn analyze_once<A: Analyzer>(
    controller: &mut Controller<A>,
    pending: PendingRequest,
    json: bool,
) -> Result<()> {
    if !json {
        println!("{}", view::render_loading(controller.session().input()));
    }
    if interactive::run_with_spinner(controller, pending, !json).await == RunOutcome::Cancelled {
        return Ok(());
    }

    let session = controller.session();
    match (session.view(), session.response(), session.failure()) {
        (View::Result, Some(response), _) => {
            if json {
                println!("{}", serde_json::to_string_pretty(response)?);
            } else {
                println!("{}", view::render_result(response, session.barcode()));
            }
            Ok(())
        }
        (_, _, Some(failure)) => {
            eprintln!("{}", view::render_error(failure));
            std::process::exit(1);
        }
        _ => Ok(()),
    }
}
