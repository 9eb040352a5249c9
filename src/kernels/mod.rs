//! This module contains the pure, stateless decoding kernels for the container's
//! primitive encodings. Each kernel reads from a `ByteCursor` and nothing else.

pub mod gamma;
