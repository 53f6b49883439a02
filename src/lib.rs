#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

pub mod blockchains;
pub mod cli;
pub mod configuration;
pub mod dao;
pub mod deposits;
pub mod error;
pub mod exporter;
pub mod helpers;
pub mod model;
pub mod normalization;
pub mod provider;
pub mod reporting;
pub mod retry;
pub mod types;
pub mod withdrawals;
