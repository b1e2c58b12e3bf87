//! Error types for cell identification and readout configuration.

use std::fmt;

use crate::types::Coordinate;

/// Errors raised while configuring the codec, the layout, or the readout.
///
/// Everything here is a construction-time failure. Run-time accumulation
/// never fails: cache misses fall back to the origin and oversized field
/// values truncate.
#[derive(Debug, Clone, PartialEq)]
pub enum CaloError {
    /// A field was declared with zero bits.
    ZeroWidth { field: String },

    /// A field extends past bit 63 of the packed key.
    FieldOutOfRange {
        field: String,
        offset: u32,
        width: u32,
    },

    /// Two fields claim at least one common bit.
    FieldOverlap { first: String, second: String },

    /// The same field name appears twice in one layout.
    DuplicateField(String),

    /// A field name required by the segmentation is missing from the layout.
    UnknownField(String),

    /// A descriptor string could not be parsed.
    MalformedDescriptor(String),

    /// A value does not fit its field (reported only by checked encoding).
    ValueOverflow { field: String, value: u64, width: u32 },

    /// Geometry layout parameters are unusable.
    InvalidLayout(String),

    /// Two cells of a layout share the same 32-bit host key.
    HostKeyCollision {
        key: i32,
        first: Coordinate,
        second: Coordinate,
    },

    /// Energy threshold must be finite and non-negative.
    InvalidThreshold(f64),

    /// Unrecognised readout mode name.
    UnknownReadoutMode(String),
}

impl fmt::Display for CaloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaloError::ZeroWidth { field } => {
                write!(f, "field '{}' has zero width", field)
            }
            CaloError::FieldOutOfRange {
                field,
                offset,
                width,
            } => {
                write!(
                    f,
                    "field '{}' at offset {} with width {} exceeds 64 bits",
                    field, offset, width
                )
            }
            CaloError::FieldOverlap { first, second } => {
                write!(f, "fields '{}' and '{}' overlap", first, second)
            }
            CaloError::DuplicateField(name) => write!(f, "duplicate field '{}'", name),
            CaloError::UnknownField(name) => write!(f, "unknown field '{}'", name),
            CaloError::MalformedDescriptor(msg) => write!(f, "malformed descriptor: {}", msg),
            CaloError::ValueOverflow {
                field,
                value,
                width,
            } => {
                write!(
                    f,
                    "value {} does not fit field '{}' ({} bits)",
                    value, field, width
                )
            }
            CaloError::InvalidLayout(msg) => write!(f, "invalid layout: {}", msg),
            CaloError::HostKeyCollision { key, first, second } => {
                write!(
                    f,
                    "cells {:?} and {:?} share host key {:#x}",
                    first, second, key
                )
            }
            CaloError::InvalidThreshold(t) => {
                write!(f, "invalid energy threshold: {} MeV", t)
            }
            CaloError::UnknownReadoutMode(name) => {
                write!(f, "unknown readout mode '{}'", name)
            }
        }
    }
}

impl std::error::Error for CaloError {}
