//! lib.rs
//! Módulos compartidos entre el servidor de voz y el dispatcher.

pub mod app;
pub mod config;
pub mod handlers;
pub mod logger;
pub mod models;
pub mod services;

#[cfg(test)]
mod tests;
