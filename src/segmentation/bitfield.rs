//! Named bit fields packed into a 64-bit cell id.
//!
//! A layout is a list of `(name, offset, width)` triples. Fields may appear in
//! any order and may leave gaps, but no two fields may share a bit and no field
//! may extend past bit 63. Layouts are validated once at construction; after
//! that `get`/`set` are plain shift-and-mask operations.

use crate::error::CaloError;
use crate::types::CellId;

const KEY_BITS: u32 = u64::BITS;

/// Declared field before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub offset: u32,
    pub width: u32,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, offset: u32, width: u32) -> Self {
        Self {
            name: name.into(),
            offset,
            width,
        }
    }
}

/// A validated field of a [`BitFieldCodec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField {
    name: String,
    offset: u32,
    width: u32,
    /// Unshifted value mask, `2^width - 1`.
    value_mask: u64,
}

impl BitField {
    fn from_spec(spec: FieldSpec) -> Result<Self, CaloError> {
        if spec.width == 0 {
            return Err(CaloError::ZeroWidth { field: spec.name });
        }
        if spec.offset >= KEY_BITS || spec.width > KEY_BITS - spec.offset {
            return Err(CaloError::FieldOutOfRange {
                field: spec.name,
                offset: spec.offset,
                width: spec.width,
            });
        }
        let value_mask = if spec.width == KEY_BITS {
            u64::MAX
        } else {
            (1u64 << spec.width) - 1
        };
        Ok(Self {
            name: spec.name,
            offset: spec.offset,
            width: spec.width,
            value_mask,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Largest value representable in this field.
    #[inline]
    pub fn max_value(&self) -> u64 {
        self.value_mask
    }

    /// Mask of the bits this field occupies inside the packed id.
    #[inline]
    pub fn key_mask(&self) -> u64 {
        self.value_mask << self.offset
    }

    /// One past the highest bit this field occupies.
    #[inline]
    pub fn end_bit(&self) -> u32 {
        self.offset + self.width
    }

    #[inline]
    pub fn fits(&self, value: u64) -> bool {
        value <= self.value_mask
    }

    #[inline]
    fn extract(&self, raw: u64) -> u64 {
        (raw >> self.offset) & self.value_mask
    }

    #[inline]
    fn insert(&self, raw: u64, value: u64) -> u64 {
        (raw & !self.key_mask()) | ((value & self.value_mask) << self.offset)
    }
}

/// Packs and unpacks named fields of a 64-bit cell id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldCodec {
    fields: Vec<BitField>,
}

impl BitFieldCodec {
    /// Build a codec from explicit field declarations.
    ///
    /// Rejects zero-width fields, fields past bit 63, overlapping fields and
    /// duplicate names.
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, CaloError> {
        if specs.is_empty() {
            return Err(CaloError::MalformedDescriptor(
                "layout has no fields".to_string(),
            ));
        }

        let mut fields: Vec<BitField> = Vec::with_capacity(specs.len());
        for spec in specs {
            let field = BitField::from_spec(spec)?;
            for existing in &fields {
                if existing.name == field.name {
                    return Err(CaloError::DuplicateField(field.name));
                }
                if existing.key_mask() & field.key_mask() != 0 {
                    return Err(CaloError::FieldOverlap {
                        first: existing.name.clone(),
                        second: field.name,
                    });
                }
            }
            fields.push(field);
        }

        Ok(Self { fields })
    }

    /// Parse a descriptor such as `"system:8,phi:8,theta:8,depth:8"`.
    ///
    /// Entries are `name:width` (placed right after the previous field) or
    /// `name:offset:width`. Signed (negative width) fields are not supported.
    pub fn from_descriptor(descriptor: &str) -> Result<Self, CaloError> {
        let mut specs = Vec::new();
        let mut next_offset: u32 = 0;

        for entry in descriptor.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(CaloError::MalformedDescriptor(format!(
                    "empty entry in '{}'",
                    descriptor
                )));
            }
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let (name, offset, width) = match parts.as_slice() {
                [name, width] => (*name, next_offset, parse_width(entry, width)?),
                [name, offset, width] => {
                    let offset = offset.parse::<u32>().map_err(|_| {
                        CaloError::MalformedDescriptor(format!("bad offset in '{}'", entry))
                    })?;
                    (*name, offset, parse_width(entry, width)?)
                }
                _ => {
                    return Err(CaloError::MalformedDescriptor(format!(
                        "expected name:width or name:offset:width, got '{}'",
                        entry
                    )))
                }
            };
            if name.is_empty() {
                return Err(CaloError::MalformedDescriptor(format!(
                    "missing field name in '{}'",
                    entry
                )));
            }
            next_offset = offset.saturating_add(width);
            specs.push(FieldSpec::new(name, offset, width));
        }

        Self::new(specs)
    }

    /// Canonical `name:offset:width` rendering of the layout.
    pub fn descriptor(&self) -> String {
        self.fields
            .iter()
            .map(|f| format!("{}:{}:{}", f.name, f.offset, f.width))
            .collect::<Vec<_>>()
            .join(",")
    }

    #[inline]
    pub fn fields(&self) -> &[BitField] {
        &self.fields
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Result<&BitField, CaloError> {
        self.index_of(name)
            .map(|i| &self.fields[i])
            .ok_or_else(|| CaloError::UnknownField(name.to_string()))
    }

    /// Read field `index` of `id`.
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get(&self, id: CellId, index: usize) -> u64 {
        self.fields[index].extract(id.as_u64())
    }

    /// Overwrite field `index` of `id`, truncating `value` to the field width.
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn set(&self, id: &mut CellId, index: usize, value: u64) {
        *id = CellId::new(self.fields[index].insert(id.as_u64(), value));
    }

    /// Sum of all field widths.
    pub fn total_width(&self) -> u32 {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// True when every field lies in bits 0..32, so the low 32-bit half of an
    /// id carries the whole address.
    pub fn fits_low_half(&self) -> bool {
        self.fields.iter().all(|f| f.end_bit() <= 32)
    }
}

fn parse_width(entry: &str, width: &str) -> Result<u32, CaloError> {
    let width = width.parse::<i64>().map_err(|_| {
        CaloError::MalformedDescriptor(format!("bad width in '{}'", entry))
    })?;
    if width < 0 {
        return Err(CaloError::MalformedDescriptor(format!(
            "signed field not supported in '{}'",
            entry
        )));
    }
    u32::try_from(width)
        .map_err(|_| CaloError::MalformedDescriptor(format!("width too large in '{}'", entry)))
}
