use crate::domain::model::UserRole;
use crate::utils::error::{HrmError, Result};
use crate::utils::validation::{
    validate_bs_year, validate_non_empty_string, validate_path, validate_range, Validate,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "hrm")]
#[command(about = "HR management toolkit: Bikram Sambat dates, profile checks and access rules")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to an hrm TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Convert a BS date (YYYY-MM-DD) to AD
    ToAd { date: String },

    /// Convert an AD date (YYYY-MM-DD) to BS
    ToBs { date: String },

    /// Print a BS month grid
    Calendar { year: i32, month: u32 },

    /// Validate a profile form stored as JSON
    ValidateProfile {
        file: PathBuf,

        #[arg(long, help = "Apply the stricter save-time rules")]
        submit: bool,
    },

    /// Show completeness and progress for a profile form stored as JSON
    Completeness { file: PathBuf },

    /// List the routes and sidebar visible to a role
    Routes {
        #[arg(value_parser = parse_role)]
        role: UserRole,
    },
}

fn parse_role(value: &str) -> std::result::Result<UserRole, String> {
    value.parse()
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validate_path("config", &path.to_string_lossy())?;
        }

        match &self.command {
            Command::ToAd { date } | Command::ToBs { date } => {
                validate_non_empty_string("date", date)
            }
            Command::Calendar { year, month } => {
                validate_bs_year("year", *year)?;
                validate_range("month", *month, 1, 12)
            }
            Command::ValidateProfile { file, .. } | Command::Completeness { file } => {
                if file.is_file() {
                    Ok(())
                } else {
                    Err(HrmError::InvalidConfigValueError {
                        field: "file".to_string(),
                        value: file.display().to_string(),
                        reason: "File does not exist".to_string(),
                    })
                }
            }
            Command::Routes { .. } => Ok(()),
        }
    }
}
