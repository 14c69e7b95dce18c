pub mod intake_service;
pub mod trade_dispatcher;
