pub mod config;
pub mod logging;

pub mod bootstrap;
pub mod error;
pub mod handler;
pub mod options;
pub mod resolve;
pub mod script;
pub mod urls;

pub use error::PremiumError;
pub use handler::PremiumHandler;
