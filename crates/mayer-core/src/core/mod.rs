//! # Core Module
//!
//! Stateless building blocks for cluster-diagram evaluation.
//!
//! ## Overview
//!
//! - **Geometry** ([`geometry`]) - Labeled point sets and the double-buffered cache of squared
//!   pair distances that feeds every bond evaluation
//! - **Bond Functions** ([`bonds`]) - Mayer functions and many-body correction factors computed
//!   from pair geometry and inverse temperature
//! - **Parameters** ([`params`]) - Serializable potential parameters loaded from TOML
//!
//! ## Numerical Conventions
//!
//! Bond functions never clamp or repair their inputs. A NaN distance yields a NaN bond and an
//! infinite pair energy yields `f = -1`, so degenerate geometry reaches the sampler unchanged.

pub mod bonds;
pub mod geometry;
pub mod params;
