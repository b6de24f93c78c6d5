//! EcoPulse
//!
//! 商品の写真・URL・バーコードからGeminiでエコスコアを判定するCLI。

pub mod badge;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod input;
pub mod interactive;
pub mod logging;
pub mod scanner;
pub mod view;
