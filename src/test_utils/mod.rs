//! Shared helpers for unit tests across modules
mod common;
mod entry_builder;

pub(crate) use common::*;
pub(crate) use entry_builder::*;
