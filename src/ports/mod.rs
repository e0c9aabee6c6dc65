//! Port traits (interfaces between domain and adapters).

pub mod config_port;
pub mod market_data_port;
pub mod report_port;
pub mod trade_port;
