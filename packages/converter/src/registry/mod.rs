//! Converter registry system for notice conversion.
//!
//! Every business term is handled by a [`FieldConverter`] that reads its
//! value from the notice and returns an OCDS fragment. Converters are
//! registered by id, can be skipped by configuration, and are run in order
//! by the [`ConversionEngine`], which folds the fragments into one release.

mod config;
mod converter;
pub mod converters;
mod core;
mod engine;
pub mod mapping;
mod types;

pub use config::{create_eforms_registry, create_legacy_registry};
pub use converter::FieldConverter;
pub use core::ConverterRegistry;
pub use engine::ConversionEngine;
pub use mapping::{FieldMapping, Scope, Transform};
pub use types::{ConversionWarning, ConvertContext};
