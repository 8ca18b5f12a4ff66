//! Aptos healthcare agent.
//!
//! A chat agent that lets a hosted language model call wallet, healthcare
//! contract and social tools on the Aptos testnet, served over a small HTTP
//! API or an interactive terminal session.

pub mod agent;
pub mod bootstrap;
pub mod chain;
pub mod config;
pub mod error;
pub mod identity;
pub mod inference;
pub mod server;
pub mod social;
pub mod tools;
pub mod types;
