pub mod adapters;
pub mod calendar;
pub mod config;
pub mod domain;
pub mod form;
pub mod profile;
pub mod routing;
pub mod services;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, MemoryStorage};
pub use calendar::BsDate;
pub use config::HrmConfig;
pub use domain::model::{User, UserRole};
pub use domain::ports::{HrBackend, Storage};
pub use profile::{ProfileSession, ProfileSettings};
pub use services::{HrService, MockStore, RestBackend};
pub use utils::error::{HrmError, Result};
