//! This crate provides the exact side of streaming quantile sketches: the
//! mergeable running statistics a sketch carries next to its buckets, and the
//! quantization of samples into bucket keys.
//!
//! A quantile sketch answers rank queries approximately, but the count, sum,
//! extrema and mean of what it has seen can be kept exactly and merged
//! cheaply. `summary::Summary` does that, `key` and `mapping` turn samples
//! into bucket indexes, `bin` counts those indexes, and `pool` recycles the
//! scratch lists sketches allocate while doing so.
#![deny(missing_docs, missing_copy_implementations, missing_debug_implementations,
        unstable_features, unused_import_braces)]

pub mod bin;
pub mod key;
pub mod mapping;
pub mod pool;
pub mod summary;
pub mod util;
