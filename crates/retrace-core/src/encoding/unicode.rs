//! Character data shared by the encodings.
//!
//! Property tables and simple case folds come from `regex-syntax`'s Unicode
//! tables. Everything is built once, on first use, and split at the ASCII and
//! Latin-1 limits so that the narrower encodings can use a prefix of the same
//! table.

use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, Mutex, OnceLock, PoisonError};

use regex_syntax::ParserBuilder;
use regex_syntax::hir::{Class, ClassUnicode, ClassUnicodeRange, HirKind};

use super::{CharType, CodePoint, CodeRange, Property};

/// Characters whose case fold expands to several characters.
pub(crate) const MULTI_CHAR_FOLDS: &[(CodePoint, &[CodePoint])] = &[
    (0x00DF, &[0x73, 0x73]),       // ß
    (0x1E9E, &[0x73, 0x73]),       // ẞ
    (0xFB00, &[0x66, 0x66]),       // ﬀ
    (0xFB01, &[0x66, 0x69]),       // ﬁ
    (0xFB02, &[0x66, 0x6C]),       // ﬂ
    (0xFB03, &[0x66, 0x66, 0x69]), // ﬃ
    (0xFB04, &[0x66, 0x66, 0x6C]), // ﬄ
    (0xFB05, &[0x73, 0x74]),       // ﬅ
    (0xFB06, &[0x73, 0x74]),       // ﬆ
];

const MAX_UNICODE: CodePoint = 0x10FFFF;

/// Table boundaries of the single-byte encodings.
const LIMITS: [CodePoint; 2] = [0x7F, 0xFF];

pub(crate) fn multi_char_fold(code: CodePoint) -> Option<&'static [CodePoint]> {
    MULTI_CHAR_FOLDS
        .iter()
        .find(|(from, _)| *from == code)
        .map(|(_, to)| *to)
}

fn split_at_limits(ranges: impl IntoIterator<Item = CodeRange>) -> Vec<CodeRange> {
    let mut out = Vec::new();
    for (mut lo, hi) in ranges {
        for limit in LIMITS {
            if lo <= limit && limit < hi {
                out.push((lo, limit));
                lo = limit + 1;
            }
        }
        out.push((lo, hi));
    }
    out
}

/// Code point ranges of a `regex-syntax` class expression.
fn class_ranges(pattern: &str) -> Option<Vec<CodeRange>> {
    let hir = ParserBuilder::new().build().parse(pattern).ok()?;
    let ranges: Vec<CodeRange> = match hir.kind() {
        HirKind::Class(Class::Unicode(class)) => class
            .ranges()
            .iter()
            .map(|r| (CodePoint::from(r.start()), CodePoint::from(r.end())))
            .collect(),
        // An empty class (e.g. surrogates) comes back as a byte class.
        HirKind::Class(Class::Bytes(class)) => class
            .ranges()
            .iter()
            .map(|r| (CodePoint::from(r.start()), CodePoint::from(r.end())))
            .collect(),
        // A class of one character is simplified to a literal.
        HirKind::Literal(lit) => {
            let mut chars = std::str::from_utf8(&lit.0).ok()?.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => vec![(CodePoint::from(c), CodePoint::from(c))],
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(split_at_limits(ranges))
}

fn contains(ranges: &[CodeRange], code: CodePoint) -> bool {
    ranges
        .binary_search_by(|&(lo, hi)| {
            if hi < code {
                std::cmp::Ordering::Less
            } else if lo > code {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

struct Folds {
    /// Equivalence classes of the simple fold, each with at least two members.
    classes: Vec<Vec<CodePoint>>,
    /// Representative of every class member that is not its own.
    target: HashMap<CodePoint, CodePoint>,
}

static FOLDS: LazyLock<Folds> = LazyLock::new(|| {
    let cased = class_ranges(r"\p{Changes_When_Casemapped}").unwrap_or_default();
    let mut seen: HashSet<CodePoint> = HashSet::new();
    let mut folds = Folds {
        classes: Vec::new(),
        target: HashMap::new(),
    };
    for c in cased
        .iter()
        .flat_map(|&(lo, hi)| lo..=hi)
        .filter_map(char::from_u32)
    {
        if seen.contains(&CodePoint::from(c)) {
            continue;
        }
        let mut class = ClassUnicode::new([ClassUnicodeRange::new(c, c)]);
        class.case_fold_simple();
        let members: Vec<CodePoint> = class
            .ranges()
            .iter()
            .flat_map(|r| CodePoint::from(r.start())..=CodePoint::from(r.end()))
            .collect();
        seen.extend(members.iter().copied());
        if members.len() < 2 {
            continue;
        }
        let to = fold_target(&members);
        for &member in &members {
            if member != to {
                folds.target.insert(member, to);
            }
        }
        folds.classes.push(members);
    }
    folds
});

/// Lowercase form of the smallest member when it belongs to the class,
/// otherwise the smallest member itself.
fn fold_target(members: &[CodePoint]) -> CodePoint {
    let first = members[0];
    let lower = char::from_u32(first).and_then(|c| {
        let mut lower = c.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) => Some(CodePoint::from(l)),
            _ => None,
        }
    });
    lower.filter(|l| members.contains(l)).unwrap_or(first)
}

/// Reports every fold relation with all participants at or below `max_code`.
pub(crate) fn for_each_fold(max_code: CodePoint, f: &mut dyn FnMut(CodePoint, &[CodePoint])) {
    for class in &FOLDS.classes {
        let members: Vec<CodePoint> = class.iter().copied().filter(|c| *c <= max_code).collect();
        if members.len() < 2 {
            continue;
        }
        for &from in &members {
            for &to in &members {
                if from != to {
                    f(from, &[to]);
                }
            }
        }
    }
    for &(from, to) in MULTI_CHAR_FOLDS {
        if from <= max_code && to.iter().all(|c| *c <= max_code) {
            f(from, to);
        }
    }
}

/// Folds `code` for an encoding limited to `max_code`, appending code points to `out`.
pub(crate) fn fold_code(code: CodePoint, max_code: CodePoint, out: &mut Vec<CodePoint>) {
    if let Some(expansion) = multi_char_fold(code) {
        out.extend_from_slice(expansion);
        return;
    }
    let folded = FOLDS.target.get(&code).copied().unwrap_or(code);
    if let Some(expansion) = multi_char_fold(folded) {
        out.extend_from_slice(expansion);
    } else if folded <= max_code {
        out.push(folded);
    } else {
        out.push(code);
    }
}

/// Class expression of a built-in type.
fn builtin_class(ctype: CharType) -> &'static str {
    match ctype {
        CharType::Alpha => r"[\p{L}\p{M}]",
        CharType::Blank => r"[\t\p{Zs}]",
        CharType::Cntrl => r"[\p{Cc}\p{Cf}\p{Cn}\p{Co}]",
        CharType::Digit => r"\p{Nd}",
        CharType::Graph => r"[^\t\n\x0B\x0C\r\x{85}\p{Z}\p{Cc}\p{Cn}]",
        CharType::Lower => r"\p{Ll}",
        CharType::Print => r"[[^\t\n\x0B\x0C\r\x{85}\p{Z}\p{Cc}\p{Cn}]\p{Zs}]",
        CharType::Punct => r"[\p{P}$+<=>^`|~]",
        CharType::Space => r"[\t\n\x0B\x0C\r\x{85}\p{Z}]",
        CharType::Upper => r"\p{Lu}",
        CharType::XDigit => r"[0-9A-Fa-f]",
        CharType::Word => r"[\p{L}\p{M}\p{Nd}\p{Pc}]",
        CharType::Alnum => r"[\p{L}\p{M}\p{Nd}]",
        CharType::Ascii => r"[\x00-\x7F]",
        CharType::Newline | CharType::Any | CharType::Property(_) => "",
    }
}

static TABLES: [OnceLock<Box<[CodeRange]>>; CharType::COMPUTED.len()] =
    [const { OnceLock::new() }; CharType::COMPUTED.len()];

/// Full Unicode range table of `ctype`.
fn ctype_table(ctype: CharType) -> &'static [CodeRange] {
    if let CharType::Property(property) = ctype {
        return property.ranges();
    }
    let Some(idx) = ctype.table_index() else {
        return &[];
    };
    TABLES[idx].get_or_init(|| {
        let ranges = match ctype {
            CharType::Newline => vec![(0x0A, 0x0A)],
            CharType::Any => split_at_limits([(0, MAX_UNICODE)]),
            other => class_ranges(builtin_class(other)).unwrap_or_default(),
        };
        ranges.into_boxed_slice()
    })
}

/// Unicode classification of `code`; callers bound it by their `max_code`.
pub(crate) fn is_code_ctype(code: CodePoint, ctype: CharType) -> bool {
    match ctype {
        CharType::Any => code <= MAX_UNICODE,
        CharType::Newline => code == 0x0A,
        other => contains(ctype_table(other), code),
    }
}

/// Ranges of `ctype` at or below `max_code`.
///
/// Tables are split at every encoding limit, so the prefix is exact.
pub(crate) fn ctype_ranges(ctype: CharType, max_code: CodePoint) -> &'static [CodeRange] {
    let table = ctype_table(ctype);
    let end = table.partition_point(|&(lo, _)| lo <= max_code);
    &table[..end]
}

/// Properties resolved so far, keyed by their loose-matching name.
static PROPERTIES: LazyLock<Mutex<HashMap<String, Property>>> = LazyLock::new(Default::default);

fn unicode_property(name: &str, key: String) -> Option<Property> {
    let mut known = PROPERTIES.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(property) = known.get(&key) {
        return Some(*property);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-' | '=' | ':' | '.'))
    {
        return None;
    }
    let ranges = class_ranges(&format!(r"\p{{{name}}}"))?;
    let property = Property {
        name: Box::leak(name.into()),
        ranges: Box::leak(ranges.into_boxed_slice()),
    };
    known.insert(key, property);
    Some(property)
}

/// Resolves a `\p{...}` name. Anything beyond the POSIX names needs `unicode`.
pub(crate) fn resolve_property(name: &str, unicode: bool) -> Option<CharType> {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect();
    let posix = match key.as_str() {
        "alpha" => Some(CharType::Alpha),
        "blank" => Some(CharType::Blank),
        "cntrl" => Some(CharType::Cntrl),
        "digit" => Some(CharType::Digit),
        "graph" => Some(CharType::Graph),
        "lower" => Some(CharType::Lower),
        "print" => Some(CharType::Print),
        "punct" => Some(CharType::Punct),
        "space" => Some(CharType::Space),
        "upper" => Some(CharType::Upper),
        "xdigit" => Some(CharType::XDigit),
        "word" => Some(CharType::Word),
        "alnum" => Some(CharType::Alnum),
        "ascii" => Some(CharType::Ascii),
        "any" => Some(CharType::Any),
        "newline" => Some(CharType::Newline),
        _ => None,
    };
    if posix.is_some() || !unicode {
        return posix;
    }
    unicode_property(name, key).map(CharType::Property)
}
