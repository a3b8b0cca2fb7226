pub mod models;
pub mod trading;
pub mod utils;
