pub mod bronze;
pub mod config;
pub mod dimensions;
pub mod facts;
pub mod gold;
pub mod gold_export;
pub mod http_client;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod rates;
pub mod search;
pub mod silver;
pub mod store;
pub mod top_players;
