pub mod combinations;
pub mod search;
pub mod trending;

#[cfg(test)]
mod search_http_tests;



pub use combinations::configure_combination_routes;
pub use search::configure_search_routes;
pub use trending::configure_trending_routes;
