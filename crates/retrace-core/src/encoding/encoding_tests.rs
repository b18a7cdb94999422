use super::{ASCII, CharType, Encoding, LATIN1, UTF8, decode_at, fold_str, prev_char_head};

fn property(name: &str) -> CharType {
    UTF8.property_ctype(name).unwrap()
}

#[test]
fn utf8_char_lengths() {
    assert_eq!(UTF8.char_len(b'a'), 1);
    assert_eq!(UTF8.char_len(0xC3), 2);
    assert_eq!(UTF8.char_len(0xE3), 3);
    assert_eq!(UTF8.char_len(0xF0), 4);
    assert_eq!(UTF8.char_len(0x80), 1);
}

#[test]
fn utf8_decode_and_encode() {
    let text = "aé日😀".as_bytes();
    assert_eq!(decode_at(&UTF8, text, 0), ('a' as u32, 1));
    assert_eq!(decode_at(&UTF8, text, 1), ('é' as u32, 2));
    assert_eq!(decode_at(&UTF8, text, 3), ('日' as u32, 3));
    assert_eq!(decode_at(&UTF8, text, 6), ('😀' as u32, 4));

    let mut out = Vec::new();
    assert_eq!(UTF8.encode('日' as u32, &mut out), Ok(3));
    assert_eq!(out, "日".as_bytes());
    assert!(UTF8.encode(0xD800, &mut out).is_err());
}

#[test]
fn utf8_malformed_input_advances() {
    let bytes = [0xE3, b'a'];
    let (_, len) = decode_at(&UTF8, &bytes, 0);
    assert_eq!(len, 2);
    assert_eq!(UTF8.decode(&bytes), 0xE3);
}

#[test]
fn utf8_left_adjust() {
    let text = "a日b".as_bytes();
    assert_eq!(UTF8.left_adjust_char_head(text, 0), 0);
    assert_eq!(UTF8.left_adjust_char_head(text, 2), 1);
    assert_eq!(UTF8.left_adjust_char_head(text, 3), 1);
    assert_eq!(UTF8.left_adjust_char_head(text, 4), 4);
    assert_eq!(prev_char_head(&UTF8, text, 4), Some(1));
    assert_eq!(prev_char_head(&UTF8, text, 0), None);
}

#[test]
fn utf8_stray_continuation_is_own_head() {
    let bytes = [b'a', 0x80, b'b'];
    assert_eq!(UTF8.left_adjust_char_head(&bytes, 1), 1);
}

#[test]
fn fold_simple_and_multi() {
    assert_eq!(fold_str(&UTF8, "HeLLo".as_bytes()), b"hello");
    assert_eq!(fold_str(&UTF8, "Straße".as_bytes()), b"strasse");
    assert_eq!(fold_str(&UTF8, "STRASSE".as_bytes()), b"strasse");
    assert_eq!(fold_str(&UTF8, "ẞ".as_bytes()), b"ss");
    assert_eq!(fold_str(&UTF8, "ﬃ".as_bytes()), b"ffi");
    assert_eq!(fold_str(&UTF8, "ΣΑΣ".as_bytes()), "σασ".as_bytes());
    assert_eq!(fold_str(&UTF8, "ς".as_bytes()), "σ".as_bytes());
}

#[test]
fn dotless_i_does_not_fold() {
    assert_eq!(fold_str(&UTF8, "ı".as_bytes()), "ı".as_bytes());
}

#[test]
fn fold_equivalents_cover_both_directions() {
    let mut pairs = Vec::new();
    UTF8.for_each_fold(&mut |from, to| {
        if from == 'k' as u32 {
            pairs.push(to.to_vec());
        }
    });
    assert!(pairs.contains(&vec!['K' as u32]));
    assert!(pairs.contains(&vec![0x212A]));

    let mut multi = Vec::new();
    UTF8.for_each_fold(&mut |from, to| {
        if from == 0xDF {
            multi.push(to.to_vec());
        }
    });
    assert!(multi.contains(&vec!['s' as u32, 's' as u32]));
    assert!(multi.contains(&vec![0x1E9E]));
}

#[test]
fn ascii_folds_only_letters() {
    let mut count = 0;
    ASCII.for_each_fold(&mut |_, _| count += 1);
    assert_eq!(count, 52);
    assert_eq!(fold_str(&ASCII, b"A1z"), b"a1z");
}

#[test]
fn latin1_folds_within_range() {
    assert_eq!(fold_str(&LATIN1, &[0xC9]), [0xE9]);
    assert_eq!(fold_str(&LATIN1, &[0xDF]), b"ss");
    // Micro sign folds to Greek mu, outside Latin-1.
    assert_eq!(fold_str(&LATIN1, &[0xB5]), [0xB5]);
}

#[test]
fn ctype_predicates() {
    assert!(UTF8.is_code_ctype('é' as u32, CharType::Alpha));
    assert!(UTF8.is_code_ctype('_' as u32, CharType::Word));
    assert!(!UTF8.is_code_ctype('-' as u32, CharType::Word));
    assert!(UTF8.is_code_ctype('\u{3000}' as u32, CharType::Space));
    assert!(UTF8.is_code_ctype('\u{3000}' as u32, CharType::Blank));
    assert!(!UTF8.is_code_ctype('\n' as u32, CharType::Blank));
    assert!(!ASCII.is_code_ctype('é' as u32, CharType::Alpha));
    assert!(UTF8.is_code_ctype('日' as u32, property("Han")));
    assert!(!UTF8.is_code_ctype('a' as u32, property("Han")));
}

#[test]
fn digit_is_decimal_number_only() {
    for ctype in [CharType::Digit, property("Nd")] {
        assert!(UTF8.is_code_ctype('7' as u32, ctype));
        assert!(UTF8.is_code_ctype('٣' as u32, ctype));
        assert!(!UTF8.is_code_ctype('½' as u32, ctype));
        assert!(!UTF8.is_code_ctype('²' as u32, ctype));
    }
    assert!(UTF8.is_code_ctype('½' as u32, property("N")));
}

#[test]
fn scripts_exclude_neighbours_and_unassigned() {
    let greek = property("Greek");
    assert!(UTF8.is_code_ctype('λ' as u32, greek));
    assert!(UTF8.is_code_ctype(0x1F00, greek));
    assert!(!UTF8.is_code_ctype(0x03E2, greek));
    assert!(!UTF8.is_code_ctype(0x1F16, greek));
    assert!(UTF8.is_code_ctype(0x03E2, property("Coptic")));
}

#[test]
fn posix_types_follow_general_categories() {
    assert!(UTF8.is_code_ctype(0x0301, CharType::Alpha));
    assert!(UTF8.is_code_ctype(0x0301, CharType::Word));
    assert!(UTF8.is_code_ctype('‿' as u32, CharType::Word));
    assert!(UTF8.is_code_ctype('«' as u32, CharType::Punct));
    assert!(UTF8.is_code_ctype('+' as u32, CharType::Punct));
    assert!(UTF8.is_code_ctype(0x200B, CharType::Cntrl));
    assert!(UTF8.is_code_ctype(' ' as u32, CharType::Print));
    assert!(!UTF8.is_code_ctype(' ' as u32, CharType::Graph));
    assert!(UTF8.is_code_ctype(0x2028, CharType::Space));
    assert!(!UTF8.is_code_ctype(0x2028, CharType::Blank));
}

#[test]
fn ctype_ranges_are_sorted_and_bounded() {
    let digits = ASCII.ctype_ranges(CharType::Digit);
    assert_eq!(digits, &[(0x30, 0x39)]);

    let words = LATIN1.ctype_ranges(CharType::Word);
    assert!(words.windows(2).all(|w| w[0].1 < w[1].0));
    assert!(words.iter().all(|&(_, hi)| hi <= 0xFF));

    let greek = UTF8.ctype_ranges(property("Greek"));
    assert_eq!(greek.first(), Some(&(0x370, 0x373)));

    let letters = property("L");
    assert!(LATIN1.ctype_ranges(letters).iter().all(|&(_, hi)| hi <= 0xFF));
    assert!(ASCII.ctype_ranges(letters).iter().all(|&(_, hi)| hi <= 0x7F));
    assert_eq!(ASCII.ctype_ranges(letters), &[(0x41, 0x5A), (0x61, 0x7A)]);
}

#[test]
fn property_names() {
    assert_eq!(UTF8.property_ctype("Alpha"), Some(CharType::Alpha));
    assert_eq!(UTF8.property_ctype("space"), Some(CharType::Space));
    assert_eq!(property("Lu").name(), "Lu");
    assert_eq!(property("Hiragana"), property("hiragana"));
    assert!(UTF8.is_code_ctype(0x0301, property("Mn")));
    assert!(UTF8.is_code_ctype(0x01C5, property("Lt")));
    assert!(UTF8.is_code_ctype('\u{2029}' as u32, property("Zp")));
    assert!(UTF8.is_code_ctype('\u{85}' as u32, property("White_Space")));
    assert_eq!(ASCII.property_ctype("Hiragana"), None);
    assert_eq!(UTF8.property_ctype("NoSuchThing"), None);
}

#[test]
fn posix_bracket_names() {
    assert_eq!(CharType::from_posix_bracket("alpha"), Some(CharType::Alpha));
    assert_eq!(CharType::from_posix_bracket("word"), Some(CharType::Word));
    assert_eq!(CharType::from_posix_bracket("Alpha"), None);
}
