pub mod bootstrap;

pub use bootstrap::{app_init, run};
