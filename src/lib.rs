//! End-to-end tests for the FPU coprocessor workspace live in `tests/`.
