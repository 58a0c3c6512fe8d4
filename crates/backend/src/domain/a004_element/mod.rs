pub mod metadata;
pub mod repository;
pub mod service;
