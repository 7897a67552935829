//! Backend of the RoVista dashboard: serves per-AS Route Origin Validation
//! time series and the overview tables as JSON, straight from pre-computed CSVs.

pub mod config;
pub mod dataset;
pub mod error;
pub mod overview;
pub mod paging;
pub mod server;
pub mod sync_list;
