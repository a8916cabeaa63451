//! Sustainability Council: sends a scenario to a generative model that plays
//! a seven-persona CSR panel, validates the structured verdict, and offers
//! follow-on tools and a coaching chatbot on top of it.

pub mod auth;
pub mod chat;
pub mod cli;
pub mod config;
pub mod council;
pub mod domain;
pub mod errors;
pub mod log;
pub mod prompt;
pub mod provider;
pub mod radar;
pub mod schema;
pub mod session;
pub mod ux;
pub mod wire;
