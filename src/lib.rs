//! EEPD-BH - Institutional website for the Escola Estadual Presidente Dutra
//!
//! Public pages (home, courses, news, contact), sign-up and sign-in, and the
//! teacher/student directories, backed either by a hosted
//! backend-as-a-service or by a local SQLite store.

pub mod api;
pub mod backend;
pub mod config;
pub mod db;
pub mod hosted;
pub mod models;
pub mod services;
pub mod theme;
pub mod web;
