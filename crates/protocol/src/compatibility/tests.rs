use super::*;
use proptest::prelude::*;
use std::io::Cursor;

fn subset_from_mask(mask: u8) -> Vec<CompatFlag> {
    CompatFlag::ALL
        .into_iter()
        .enumerate()
        .filter(|(index, _)| mask & (1 << index) != 0)
        .map(|(_, flag)| flag)
        .collect()
}

#[test]
fn masks_are_exactly_the_first_six_powers_of_two() {
    let masks: Vec<u8> = CompatFlag::ALL.iter().map(|flag| flag.bit()).collect();
    assert_eq!(masks, vec![1, 2, 4, 8, 16, 32]);
    assert!(masks.iter().all(|bit| bit.is_power_of_two()));
}

#[test]
fn empty_set_encodes_to_zero() {
    assert_eq!(CompatFlags::EMPTY.encode(), 0);
    assert_eq!(CompatFlags::from_flags(&[]).encode(), 0);
    assert!(CompatFlags::decode(0).is_empty());
}

#[test]
fn full_set_encodes_to_63() {
    assert_eq!(CompatFlags::ALL.encode(), 63);
    assert_eq!(CompatFlags::ALL.len(), 6);
    assert_eq!(CompatFlags::decode(63), CompatFlags::ALL);
}

#[test]
fn every_subset_survives_encode_then_decode() {
    for mask in 0u8..64 {
        let subset = subset_from_mask(mask);
        let flags: CompatFlags = subset.iter().copied().collect();
        let decoded = CompatFlags::decode(flags.encode());
        assert_eq!(decoded, flags, "mask {mask:#04x}");
        assert_eq!(decoded.iter().collect::<Vec<_>>(), subset);
    }
}

#[test]
fn undefined_bits_are_ignored_on_decode() {
    let decoded = CompatFlags::decode(0b1100_0010);
    assert_eq!(decoded.iter().collect::<Vec<_>>(), vec![CompatFlag::SymlinkTimes]);
}

#[test]
fn capability_letters_map_to_flags() {
    let flags = CompatFlags::from_capability_letters("LsfxC");
    assert_eq!(flags.encode(), 0b11_1110);
    assert!(!flags.contains(CompatFlag::IncRecurse));

    let with_unknown = CompatFlags::from_capability_letters("iIvu");
    assert_eq!(with_unknown.iter().collect::<Vec<_>>(), vec![CompatFlag::IncRecurse]);
}

#[test]
fn wire_byte_is_written_and_read_back() {
    let flags = CompatFlags::from_flags(&[CompatFlag::SafeFileList, CompatFlag::IncRecurse]);
    let mut out = Vec::new();
    flags.write_to(&mut out).unwrap();
    assert_eq!(out, vec![9]);
    assert_eq!(CompatFlags::read_from(&mut Cursor::new(out)).unwrap(), flags);
}

#[test]
fn display_lists_upstream_names() {
    let flags = CompatFlags::EMPTY
        .with(CompatFlag::SymlinkTimes)
        .with(CompatFlag::ChecksumSeedFix);
    assert_eq!(flags.to_string(), "CF_SYMLINK_TIMES|CF_CHKSUM_SEED_FIX");
    assert_eq!(CompatFlags::EMPTY.to_string(), "none");
}

proptest! {
    #[test]
    fn decode_keeps_only_defined_bits(byte in any::<u8>()) {
        let decoded = CompatFlags::decode(byte);
        prop_assert_eq!(decoded.encode(), byte & 63);
        prop_assert_eq!(CompatFlags::decode(decoded.encode()), decoded);
    }
}
