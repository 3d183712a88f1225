//! Course matching, pass-rate aggregation, and grade reporting.
//!
//! This module joins each student's entitled courses with the courses they
//! took, computes pass percentages per course and per student, and groups
//! the matched courses by grade for the contact report.

pub mod aggregate;
pub mod analyzer;
pub mod grade;
pub mod grouper;
pub mod matcher;
pub mod roster;
pub mod types;
pub mod utility;
