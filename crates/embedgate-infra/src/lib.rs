//! Infrastructure layer for embedgate.
//!
//! Contains implementations of the ports defined in `embedgate-core`: the
//! four backend adapters (local model, ONNX-style, TorchServe-style,
//! Triton-style) and the loader that builds the configured one, plus TOML
//! configuration loading and the simulated remote inference service used for
//! local runs and tests.

pub mod backend;
pub mod config;
pub mod simulator;
