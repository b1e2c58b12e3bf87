//! The four-field cell codec: (system, phi, theta, depth) <-> 64-bit id.

use super::bitfield::BitFieldCodec;
use crate::error::CaloError;
use crate::types::{CellId, Coordinate};

/// Default descriptor: four 8-bit fields filling the low 32 bits.
pub const DEFAULT_DESCRIPTOR: &str = "system:8,phi:8,theta:8,depth:8";

/// Names of the layout fields that hold each coordinate.
///
/// Lets a readout reuse a layout whose fields are named differently
/// (e.g. `layer` instead of `depth`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub system: String,
    pub phi: String,
    pub theta: String,
    pub depth: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            system: "system".to_string(),
            phi: "phi".to_string(),
            theta: "theta".to_string(),
            depth: "depth".to_string(),
        }
    }
}

/// Encodes coordinates with a fixed bit layout.
///
/// Field indices are resolved once at construction. Values wider than their
/// field are truncated by [`encode`](Self::encode); debug builds log each
/// truncation. Use [`try_encode`](Self::try_encode) to reject them instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCodec {
    coder: BitFieldCodec,
    /// Layout index for system, phi, theta, depth.
    slots: [usize; 4],
}

impl CellCodec {
    pub fn new(coder: BitFieldCodec) -> Result<Self, CaloError> {
        Self::with_names(coder, &FieldNames::default())
    }

    pub fn with_names(coder: BitFieldCodec, names: &FieldNames) -> Result<Self, CaloError> {
        let resolve = |name: &str| {
            coder
                .index_of(name)
                .ok_or_else(|| CaloError::UnknownField(name.to_string()))
        };
        let slots = [
            resolve(&names.system)?,
            resolve(&names.phi)?,
            resolve(&names.theta)?,
            resolve(&names.depth)?,
        ];
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                if slots[i] == slots[j] {
                    return Err(CaloError::DuplicateField(
                        coder.fields()[slots[i]].name().to_string(),
                    ));
                }
            }
        }
        Ok(Self { coder, slots })
    }

    pub fn from_descriptor(descriptor: &str) -> Result<Self, CaloError> {
        Self::new(BitFieldCodec::from_descriptor(descriptor)?)
    }

    #[inline]
    pub fn layout(&self) -> &BitFieldCodec {
        &self.coder
    }

    /// Pack a coordinate, truncating fields that exceed their width.
    pub fn encode(&self, coordinate: Coordinate) -> CellId {
        #[cfg(debug_assertions)]
        self.report_truncation(coordinate);

        let mut id = CellId::default();
        for (slot, value) in self.slots.iter().zip(coordinate.to_array()) {
            self.coder.set(&mut id, *slot, u64::from(value));
        }
        id
    }

    /// Pack a coordinate, failing if any field does not fit.
    pub fn try_encode(&self, coordinate: Coordinate) -> Result<CellId, CaloError> {
        for (slot, value) in self.slots.iter().zip(coordinate.to_array()) {
            let field = &self.coder.fields()[*slot];
            if !field.fits(u64::from(value)) {
                return Err(CaloError::ValueOverflow {
                    field: field.name().to_string(),
                    value: u64::from(value),
                    width: field.width(),
                });
            }
        }
        Ok(self.encode(coordinate))
    }

    pub fn decode(&self, id: CellId) -> Coordinate {
        // Fields are at most as wide as the id; values beyond u32 can only
        // come from layouts with >32-bit coordinate fields and are truncated.
        Coordinate::from_array(self.slots.map(|slot| self.coder.get(id, slot) as u32))
    }

    #[inline]
    pub fn system(&self, id: CellId) -> u32 {
        self.coder.get(id, self.slots[0]) as u32
    }

    #[inline]
    pub fn phi(&self, id: CellId) -> u32 {
        self.coder.get(id, self.slots[1]) as u32
    }

    #[inline]
    pub fn theta(&self, id: CellId) -> u32 {
        self.coder.get(id, self.slots[2]) as u32
    }

    #[inline]
    pub fn depth(&self, id: CellId) -> u32 {
        self.coder.get(id, self.slots[3]) as u32
    }

    #[cfg(debug_assertions)]
    fn report_truncation(&self, coordinate: Coordinate) {
        for (slot, value) in self.slots.iter().zip(coordinate.to_array()) {
            let field = &self.coder.fields()[*slot];
            if !field.fits(u64::from(value)) {
                log::warn!(
                    "cell codec: value {} truncated to {} bits in field '{}'",
                    value,
                    field.width(),
                    field.name()
                );
            }
        }
    }
}

impl Default for CellCodec {
    fn default() -> Self {
        // DEFAULT_DESCRIPTOR is a valid layout with all four names.
        let coder = BitFieldCodec::new(vec![
            super::FieldSpec::new("system", 0, 8),
            super::FieldSpec::new("phi", 8, 8),
            super::FieldSpec::new("theta", 16, 8),
            super::FieldSpec::new("depth", 24, 8),
        ]);
        match coder.and_then(Self::new) {
            Ok(codec) => codec,
            Err(e) => unreachable!("default layout rejected: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::halves::{from_low32, split_low};

    #[test]
    fn test_default_matches_descriptor() {
        let parsed = CellCodec::from_descriptor(DEFAULT_DESCRIPTOR).unwrap();
        assert_eq!(CellCodec::default(), parsed);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = CellCodec::default();
        let c = Coordinate::new(3, 5, 7, 9);
        let id = codec.encode(c);
        assert_eq!(codec.decode(id), c);
        assert_eq!(codec.system(id), 3);
        assert_eq!(codec.phi(id), 5);
        assert_eq!(codec.theta(id), 7);
        assert_eq!(codec.depth(id), 9);
    }

    #[test]
    fn test_sweep_each_field_independently() {
        let codec = CellCodec::from_descriptor("system:4,phi:10,theta:6,depth:5").unwrap();
        let maxima: Vec<u32> = codec
            .layout()
            .fields()
            .iter()
            .map(|f| f.max_value() as u32)
            .collect();
        let base = Coordinate::new(1, 2, 3, 4);

        for field in 0..4 {
            let mut seen = std::collections::HashSet::new();
            for value in 0..=maxima[field] {
                let mut arr = base.to_array();
                arr[field] = value;
                let c = Coordinate::from_array(arr);
                let id = codec.encode(c);
                assert_eq!(codec.decode(id), c);
                assert!(seen.insert(id), "collision in field {} at {}", field, value);
            }
        }
    }

    #[test]
    fn test_no_collisions_small_grid() {
        let codec = CellCodec::from_descriptor("system:2,phi:3,theta:2,depth:2").unwrap();
        let mut seen = std::collections::HashSet::new();
        for s in 0..4 {
            for p in 0..8 {
                for t in 0..4 {
                    for d in 0..4 {
                        assert!(seen.insert(codec.encode(Coordinate::new(s, p, t, d))));
                    }
                }
            }
        }
        assert_eq!(seen.len(), 4 * 8 * 4 * 4);
    }

    #[test]
    fn test_truncation_is_silent() {
        let codec = CellCodec::default();
        let id = codec.encode(Coordinate::new(0x1FF, 1, 0, 0));
        assert_eq!(codec.decode(id), Coordinate::new(0xFF, 1, 0, 0));
    }

    /// Collects warnings so truncation reports can be checked.
    struct WarnCapture {
        lines: std::sync::Mutex<Vec<String>>,
    }

    impl log::Log for WarnCapture {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                if let Ok(mut lines) = self.lines.lock() {
                    lines.push(record.args().to_string());
                }
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: WarnCapture = WarnCapture {
        lines: std::sync::Mutex::new(Vec::new()),
    };

    #[test]
    #[cfg(debug_assertions)]
    fn test_truncation_warns_in_debug_builds() {
        // Only this test installs a logger in the library test binary.
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Warn);

        let codec = CellCodec::default();
        codec.encode(Coordinate::new(2, 0x3A5, 0, 0));

        let lines = CAPTURE.lines.lock().unwrap();
        assert!(
            lines
                .iter()
                .any(|l| l.contains("value 933 truncated to 8 bits in field 'phi'")),
            "{:?}",
            *lines
        );
    }

    #[test]
    fn test_try_encode_rejects_overflow() {
        let codec = CellCodec::default();
        let err = codec.try_encode(Coordinate::new(0, 256, 0, 0)).unwrap_err();
        assert_eq!(
            err,
            CaloError::ValueOverflow {
                field: "phi".to_string(),
                value: 256,
                width: 8
            }
        );
        assert!(codec.try_encode(Coordinate::new(255, 255, 255, 255)).is_ok());
    }

    #[test]
    fn test_low_half_decodes_scenario() {
        let codec = CellCodec::default();
        let id = codec.encode(Coordinate::new(3, 5, 0, 0));
        let low = split_low(id);
        assert_eq!(codec.decode(from_low32(low)), Coordinate::new(3, 5, 0, 0));
    }

    #[test]
    fn test_custom_field_names() {
        let coder = BitFieldCodec::from_descriptor("system:4,module:6,row:6,layer:4").unwrap();
        assert_eq!(
            CellCodec::new(coder.clone()).unwrap_err(),
            CaloError::UnknownField("phi".to_string())
        );

        let names = FieldNames {
            phi: "module".to_string(),
            theta: "row".to_string(),
            depth: "layer".to_string(),
            ..FieldNames::default()
        };
        let codec = CellCodec::with_names(coder, &names).unwrap();
        let c = Coordinate::new(2, 40, 11, 3);
        assert_eq!(codec.decode(codec.encode(c)), c);
    }

    #[test]
    fn test_names_must_be_distinct() {
        let coder = BitFieldCodec::from_descriptor(DEFAULT_DESCRIPTOR).unwrap();
        let names = FieldNames {
            depth: "theta".to_string(),
            ..FieldNames::default()
        };
        assert_eq!(
            CellCodec::with_names(coder, &names).unwrap_err(),
            CaloError::DuplicateField("theta".to_string())
        );
    }
}
