//! One-dimensional cutting-stock allocation for pipe and tube material.
//!
//! Demands and stock are bucketed by tube type; within a type, each stock
//! piece is filled optimally from the remaining demand (0/1 knapsack), and
//! whatever is left is packed first-fit into the default stock length.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod error;
pub mod knapsack;
pub mod observer;
pub mod packer;
pub mod render;
pub mod report;
pub mod solver;
pub mod types;
pub mod validate;

pub use config::CutConfig;
pub use error::{CutError, Result};
pub use solver::Solver;
pub use types::{CutResult, Demand, Group, Job, Stock};
