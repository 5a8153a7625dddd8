//! 业务实体模块

pub mod economic_event;

pub use economic_event::{EconomicEvent, Volatility};
