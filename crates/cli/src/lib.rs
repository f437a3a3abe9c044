//! MA plan validator CLI library

pub mod commands;

#[cfg(test)]
mod fixtures;
