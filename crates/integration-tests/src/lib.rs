//! Cross-crate test suite; see `tests/`.
