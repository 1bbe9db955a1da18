// Library for tests to access modules

pub mod aggregator;
pub mod channel;
pub mod config;
pub mod models;
pub mod registry;
pub mod routes;
pub mod version;
pub mod worker;
