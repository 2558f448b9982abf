pub mod chain;
pub mod configure;
pub mod datastore;
pub mod flow;
pub mod logger;
pub mod units;
