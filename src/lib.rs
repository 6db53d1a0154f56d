pub mod config;
pub mod credential;
pub mod db;
pub mod dto;
pub mod http;
pub mod logic;
pub mod seed;
pub mod views;
