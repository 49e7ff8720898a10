pub mod benchmark_service;
pub mod holdings_normalizer;
pub mod market_data_service;
pub mod risk_service;
pub mod valuation_service;
