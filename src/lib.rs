//! Intersection Simulation Library
//!
//! An adaptive four-way signal scheduler with emergency preemption, plus the
//! vehicle motion model that obeys it.

pub mod simulation;
