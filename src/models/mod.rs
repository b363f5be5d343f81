pub mod restaurant;
pub mod search;
