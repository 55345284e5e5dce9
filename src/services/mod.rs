pub mod fill_poller;
pub mod position_poller;
