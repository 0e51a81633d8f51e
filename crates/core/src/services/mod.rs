pub mod alert_service;
pub mod cache_service;
pub mod country_service;
pub mod portfolio_service;
pub mod watchlist_service;
