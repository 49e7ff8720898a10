pub mod analytics;
pub mod chart;
pub mod holding;
pub mod price;
pub mod report;
pub mod settings;
