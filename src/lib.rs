#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod db;
pub mod generator;
pub mod key;
pub mod numeric;
pub mod properties;
pub mod run;
pub mod sharded_stats;
pub mod version;
pub mod workload;
