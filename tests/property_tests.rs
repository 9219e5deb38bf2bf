// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! This test suite uses proptest to verify properties that must hold for all
//! valid inputs: filter expressions, poll backoff and task lifecycles.

mod property;
