// Engine library root

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod services;
pub mod simulation;
pub mod storage;
