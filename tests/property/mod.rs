// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod poll_policy;
mod query_filter;
mod task_lifecycle;
