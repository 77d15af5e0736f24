//! Entity module - SeaORM entity definitions
//!
//! One table backs the whole directory: the employee record carries its own
//! permission level, so there is no separate role table.

pub mod employee;
