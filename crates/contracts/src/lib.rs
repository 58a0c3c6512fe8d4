//! Shared contracts for the dynamic metadata service.
//!
//! Aggregates, DTOs and fixed enumerations used by the backend and by any
//! client that talks to its HTTP API.

pub mod domain;
pub mod enums;
pub mod shared;
