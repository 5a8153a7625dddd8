pub mod cli;
pub mod env;
pub mod log;
pub mod settings;

pub use settings::NewsSettings;
