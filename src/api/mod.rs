pub mod espn_api;
pub mod insider_api;
pub mod odds_api;
pub mod warehouse;
