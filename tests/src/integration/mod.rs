//! Cross-component integration tests.

pub mod fixtures;

#[cfg(test)]
mod flows;
#[cfg(test)]
mod properties;
