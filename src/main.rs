use chrono::NaiveDate;
use clap::Parser;
use hrm_core::calendar::{BsDate, DatePicker};
use hrm_core::config::{CliConfig, Command, HrmConfig};
use hrm_core::domain::model::User;
use hrm_core::domain::profile::ProfileForm;
use hrm_core::form::{completeness, progress, section_checklist, validate_for_submit, validate_realtime};
use hrm_core::routing::{authorize, sidebar, Route};
use hrm_core::utils::error::{HrmError, Result};
use hrm_core::utils::{logger, validation::Validate};
use std::path::Path;

const WEEKDAY_HEADER: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match &cli.config {
        Some(path) => match HrmConfig::from_file(path).and_then(|c| c.validate().map(|_| c)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        },
        None => HrmConfig::default(),
    };

    // 初始化日誌
    if cli.config.is_none() {
        logger::init_cli_logger(cli.verbose);
    } else if config.logging.format == "json" {
        logger::init_json_logger(&config.logging.level);
    } else {
        logger::init_cli_logger_with_level(&config.logging.level, cli.verbose);
    }
    tracing::debug!("CLI args: {:?}", cli);

    // 驗證參數
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if let Err(e) = run(&cli.command).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

async fn run(command: &Command) -> Result<()> {
    let today = chrono::Local::now().date_naive();

    match command {
        Command::ToAd { date } => {
            let bs: BsDate = date.parse()?;
            println!("{} BS = {} AD ({})", bs, bs.to_ad(), bs.weekday());
        }
        Command::ToBs { date } => {
            let ad = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|e| {
                HrmError::InvalidDate {
                    value: date.clone(),
                    reason: e.to_string(),
                }
            })?;
            let bs = BsDate::from_ad(ad)?;
            println!("{} AD = {} BS ({} {})", ad, bs, bs.month_name(), bs.year());
        }
        Command::Calendar { year, month } => {
            let first = BsDate::new(*year, *month, 1)?;
            let picker = DatePicker::new(Some(&first.to_string()), BsDate::today(today)?);
            print_month(&first, &picker);
        }
        Command::ValidateProfile { file, submit } => {
            let form = load_form(file).await?;
            let errors = if *submit {
                validate_for_submit(&form)
            } else {
                validate_realtime(&form)
            };
            if errors.is_empty() {
                println!("✅ Profile is valid");
                return Ok(());
            }
            println!("❌ {}", errors.summary());
            for (field, message) in errors.iter() {
                println!("  {}: {}", field, message);
            }
            return Err(HrmError::FormValidation {
                errors: errors.into_map(),
            });
        }
        Command::Completeness { file } => {
            let form = load_form(file).await?;
            let badge = completeness(&form);
            let card = progress(&form);
            println!(
                "📊 Completeness: {}% ({}/{}) {}",
                badge.percentage,
                badge.completed,
                badge.total,
                badge.status()
            );
            println!("📈 Progress: {}% ({}/{})", card.percentage, card.completed, card.total);
            for section in section_checklist(&form) {
                let mark = if section.completed { "✅" } else { "⬜" };
                println!("  {} {}", mark, section.name);
            }
        }
        Command::Routes { role } => {
            let preview = User::new("preview", "Preview", "preview@hrm.local", *role);
            println!("🔐 Routes for {}:", role);
            for route in Route::ALL {
                println!("  {:<32} {:?}", route.path(), authorize(route, Some(&preview)));
            }
            println!("📋 Sidebar:");
            for item in sidebar(*role) {
                println!("  {:<24} {}", item.label, item.route.path());
            }
        }
    }
    Ok(())
}

async fn load_form(path: &Path) -> Result<ProfileForm> {
    let content = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&content)?)
}

fn print_month(first: &BsDate, picker: &DatePicker) {
    println!("      {} {}", first.month_name(), first.year());
    println!("{}", WEEKDAY_HEADER.join(" "));
    let cells = picker.grid();
    for week in cells.chunks(7) {
        let line: Vec<String> = week
            .iter()
            .map(|cell| match cell.day {
                Some(day) if cell.is_today => format!("{:>2}*", day),
                Some(day) => format!("{:>3}", day),
                None => "   ".to_string(),
            })
            .collect();
        println!("{}", line.join(" "));
    }
}
