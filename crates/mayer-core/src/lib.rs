//! # Mayer Sampling Core Library
//!
//! Cluster-diagram evaluation and trial bookkeeping for computing virial coefficients
//! of fluids with Mayer-sampling Monte Carlo.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict two-layer split between stateless physics and the stateful
//! machinery that runs inside the Monte Carlo loop.
//!
//! - **[`core`]: The Foundation.** Point geometry with double-buffered pair distances
//!   (`PairGeometryCache`), pluggable bond functions (hard-sphere steps, soft Mayer
//!   functions, compositions, many-body corrections) and reference pair potentials with
//!   their TOML-loaded parameters.
//!
//! - **[`engine`]: The Logic Core.** Subset recursion over the 2^n lattice of point subsets
//!   (`DiagramEngine`), the diagram-class cluster values built on it, the trial/accept/reject
//!   state machine (`TrialProtocol`) and small helpers for driving and replicating runs.
//!
//! A sampling run owns one geometry cache, one cluster value and one trial protocol.
//! Independent runs share no mutable state and are scaled out by replication.

pub mod core;
pub mod engine;
