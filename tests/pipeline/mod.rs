//! End-to-end pipeline tests, grouped by concern.

mod alerts;
mod fallback;
mod scan;
