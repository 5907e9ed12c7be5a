//! Gazette - a small server-rendered blog
//!
//! This library provides the core functionality for the Gazette blog:
//! articles, comments, likes, search, and session-based login.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod view;
pub mod web;
