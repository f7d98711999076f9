pub mod api_connection;
pub mod cli;
pub mod config;
pub mod fallback;
pub mod logging;
pub mod profile_store;
pub mod prompt_builder;
pub mod recipe;
pub mod recipe_parser;
pub mod recommender;
pub mod web;
