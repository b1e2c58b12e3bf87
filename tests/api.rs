//! Public API integration tests for toycalo.

mod support;

use toycalo::segmentation::halves::{from_high32, from_low32, split_high, split_low};
use toycalo::{
    BarrelLayout, CaloError, CalorimeterAction, CellCodec, CellId, CellPosition,
    CellSegmentation, Coordinate, PositionCache, PositionLookup, ReadoutConfig, ReadoutMode, Step,
    ToySegmentation,
};
use support::steps::built_segmentation;

#[test]
fn test_scenario_low_half_decodes() {
    let codec = CellCodec::from_descriptor("system:8,phi:8,theta:8,depth:8").unwrap();
    let id = codec.encode(Coordinate::new(3, 5, 0, 0));
    let low = split_low(id);
    assert_eq!(codec.decode(from_low32(low)), Coordinate::new(3, 5, 0, 0));
}

#[test]
fn test_encode_decode_over_layouts() {
    for descriptor in [
        "system:8,phi:8,theta:8,depth:8",
        "system:4,phi:12,theta:12,depth:4",
        "depth:0:6,theta:6:10,phi:16:16,system:40:8",
    ] {
        let codec = CellCodec::from_descriptor(descriptor).unwrap();
        let c = Coordinate::new(5, 9, 33, 2);
        assert_eq!(codec.decode(codec.encode(c)), c, "layout {}", descriptor);
    }
}

#[test]
fn test_half_keys_roundtrip_independently() {
    for raw in [0u64, 1, 0xFFFF_FFFF, 0x1_0000_0000, 0xABCD_EF01_2345_6789, u64::MAX] {
        let id = CellId::new(raw);
        assert_eq!(
            from_low32(split_low(id)).as_u64() & 0xFFFF_FFFF,
            raw & 0xFFFF_FFFF
        );
        assert_eq!(from_high32(split_high(id)).as_u64() >> 32, raw >> 32);
    }
}

#[test]
fn test_malformed_layouts_fail_fast() {
    assert!(matches!(
        CellCodec::from_descriptor("system:40,phi:40,theta:1,depth:1"),
        Err(CaloError::FieldOutOfRange { .. })
    ));
    assert!(matches!(
        CellCodec::from_descriptor("system:0:8,phi:7:8,theta:16:8,depth:24:8"),
        Err(CaloError::FieldOverlap { .. })
    ));
    assert!(matches!(
        CellCodec::from_descriptor("system:8,phi:8,theta:8"),
        Err(CaloError::UnknownField(_))
    ));
}

#[test]
fn test_cache_contract() {
    let mut cache = PositionCache::new();
    assert_eq!(cache.lookup(11), CellPosition::ORIGIN);
    cache.record(11, CellPosition::new(1.0, 2.0, 3.0));
    assert_eq!(cache.lookup(11), CellPosition::new(1.0, 2.0, 3.0));
    cache.record(11, CellPosition::new(4.0, 5.0, 6.0));
    assert_eq!(cache.lookup(11), CellPosition::new(4.0, 5.0, 6.0));
}

#[test]
fn test_threshold_merge_through_action() {
    let (segmentation, cells) = built_segmentation();
    let key = cells[3].low;

    let mut action =
        CalorimeterAction::for_segmentation(&segmentation, ReadoutConfig::default()).unwrap();
    for edep in [0.05, 0.2, 0.3] {
        action.process(&Step::new(key, edep));
    }
    let hits = action.end_event();

    assert_eq!(hits.energy.len(), 1);
    let hit = hits.energy.get(key).unwrap();
    assert!((hit.energy_deposit - 0.5).abs() < 1e-12);
    assert_eq!(hit.position, cells[3].position);
    assert_eq!(segmentation.decode(hit.cell_id), cells[3].coordinate);
}

#[test]
fn test_unknown_host_key_lands_at_origin() {
    let (segmentation, _cells) = built_segmentation();
    let mut action =
        CalorimeterAction::for_segmentation(&segmentation, ReadoutConfig::default()).unwrap();
    action.process(&Step::new(0x7777, 1.0));
    let hits = action.end_event();
    assert!(hits.energy.get(0x7777).unwrap().position.is_origin());
    assert!(!segmentation.check_host_key(0x7777).is_compatible());
}

#[test]
fn test_layout_keys_are_compatible_host_keys() {
    let (segmentation, cells) = built_segmentation();
    for cell in &cells {
        assert!(segmentation.check_host_key(cell.low).is_compatible());
        assert_eq!(segmentation.position(cell.low), cell.position);
    }
}

#[test]
fn test_layout_overwrites_same_cells_on_rebuild() {
    let mut segmentation = ToySegmentation::default();
    let narrow = BarrelLayout {
        inner_radius: 10.0,
        outer_radius: 20.0,
        ..BarrelLayout::default()
    };
    narrow.build(&mut segmentation).unwrap();
    let cells = BarrelLayout::default().build(&mut segmentation).unwrap();

    assert_eq!(segmentation.positions().len(), cells.len());
    assert!((segmentation.position(cells[0].low).x - 1100.0).abs() < 1e-9);
}

#[test]
fn test_shared_segmentation_across_actions() {
    let (segmentation, cells) = built_segmentation();
    let shared = segmentation.into_shared();

    let config = ReadoutConfig {
        mode: ReadoutMode::WithInteresting,
        ..ReadoutConfig::default()
    };
    let mut a = CalorimeterAction::new(shared.clone(), config.clone()).unwrap();
    let mut b = CalorimeterAction::new(shared.clone(), config).unwrap();

    a.process(&Step::new(cells[0].low, 1.0));
    b.process(&Step::new(cells[1].low, 1.0));

    let ha = a.end_event();
    let hb = b.end_event();
    assert!(ha.energy.contains(cells[0].low) && !ha.energy.contains(cells[1].low));
    assert!(hb.energy.contains(cells[1].low) && !hb.energy.contains(cells[0].low));
}

#[test]
fn test_dyn_segmentation_handle() {
    fn build_into(seg: &mut dyn CellSegmentation) -> usize {
        BarrelLayout::default().build(seg).unwrap().len()
    }
    let mut segmentation = ToySegmentation::default();
    assert_eq!(build_into(&mut segmentation), 12);
}
