// 公开导出的模块，供外部使用
pub mod models;
pub mod indicators;
pub mod errors;
pub mod services;
pub mod store;
pub mod scrapers;
pub mod config;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::result::{ResultDocument, RsiPoint, TickerResult, OutputFormat};
pub use models::series::{FetchOutcome, PriceSeries};
pub use indicators::{rsi_history, rsi_latest, Precision};
pub use services::rsi_service::{merge_results, RsiService};
pub use errors::{Result, RsiHubError};
