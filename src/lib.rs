//! Arbor - a lightweight page-tree CMS server
//!
//! This library provides the page tree, content blocks, and the HTTP
//! surface (site front end plus read API) of the Arbor CMS.

pub mod api;
pub mod blocks;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod render;
pub mod services;
pub mod site;
