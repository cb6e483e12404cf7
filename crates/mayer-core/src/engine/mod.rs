//! # Engine Module
//!
//! Turns the Mayer bonds of a point configuration into sampled cluster values.
//!
//! ## Layers
//!
//! - [`diagram`] - subset-recursion graph sums (connected, biconnected, Percus–Yevick)
//! - [`cluster`] - cluster values combining diagram classes, cached per geometry side
//! - [`trial`] - the propose, evaluate, accept/reject state machine
//! - [`sampling`] - proposal moves, the Metropolis test and a seeded sampler
//! - [`replicas`] - independent replicas on a thread pool
//! - [`config`] / [`error`] - builder configuration and the error stack

pub mod cluster;
pub mod config;
pub mod diagram;
pub mod error;
pub mod replicas;
pub mod sampling;
pub mod trial;
