pub mod error;
pub mod filter;
pub mod finders;
pub mod geo;
pub mod michelin_service;
pub mod pagination;
pub mod ranking;
pub mod similarity;
