pub mod agent;
pub mod history;
pub mod onboard;
