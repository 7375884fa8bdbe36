pub mod ports;
pub mod event_bus;
pub mod context;
pub mod splitter;
pub mod codec;
pub mod sink;
pub mod provider;
pub mod knowledge;
pub mod orchestrator;
pub mod store;
pub mod sender;
