pub mod analysis_export;
pub mod analysis_fetch;
pub mod charts;
pub mod demo_feed;
pub mod feed;
pub mod http_client;
pub mod panels;
pub mod state;
