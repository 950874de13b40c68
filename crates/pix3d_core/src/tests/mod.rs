//! Cross-module tests and shared fixtures


mod level_round_trip;
