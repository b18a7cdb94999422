use crate::CharClass;

#[test]
fn low_and_high_ranges() {
    let class = CharClass::from_ranges(&[(0x30, 0x39), (0xE0, 0x10F), (0x3041, 0x3096)], false);
    assert!(class.matches('5' as u32));
    assert!(!class.matches('a' as u32));
    assert!(class.matches(0xE9));
    assert!(class.matches(0x100));
    assert!(class.matches(0x3042));
    assert!(!class.matches(0x3097));
    assert!(class.has_high());
}

#[test]
fn negation_inverts_every_code() {
    let class = CharClass::from_ranges(&[(b'a' as u32, b'c' as u32)], true);
    assert!(!class.matches('b' as u32));
    assert!(class.matches('d' as u32));
    assert!(class.matches(0x4E00));
    assert!(class.low_map()[b'z' as usize]);
    assert!(!class.low_map()[b'a' as usize]);
}

#[test]
fn display_merges_adjacent_codes() {
    let class = CharClass::from_ranges(&[(b'a' as u32, b'c' as u32), (b'x' as u32, b'x' as u32)], false);
    assert_eq!(class.to_string(), "[a-cx]");
    let neg = CharClass::from_ranges(&[(b'-' as u32, b'-' as u32), (0x3000, 0x3000)], true);
    assert_eq!(neg.to_string(), "[^\\x{2d}\\x{3000}]");
}
