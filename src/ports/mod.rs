//! Ports layer: Trait definitions for the persisted model artifacts.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the prediction pipeline and whatever format the artifacts were
//! exported in.

mod model;

pub use model::{Classifier, Scaler};
