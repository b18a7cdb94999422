use crate::NameTable;

#[test]
fn multiplexed_name_resolves_to_last_set_group() {
    let mut names = NameTable::new();
    names.insert("x", 1);
    names.insert("x", 2);
    names.insert("y", 3);

    assert_eq!(names.groups("x"), Some(&[1, 2][..]));
    assert_eq!(names.resolve("x", |g| g == 1), Some(1));
    assert_eq!(names.resolve("x", |g| g == 2), Some(2));
    assert_eq!(names.resolve("x", |_| true), Some(2));
    // Nothing participated: fall back to the last definition.
    assert_eq!(names.resolve("x", |_| false), Some(2));
    assert_eq!(names.resolve("z", |_| true), None);
}

#[test]
fn duplicate_insert_is_ignored() {
    let mut names = NameTable::new();
    names.insert("a", 1);
    names.insert("a", 1);
    assert_eq!(names.groups("a"), Some(&[1][..]));
    assert_eq!(names.name_of(1), Some("a"));
    assert_eq!(names.name_of(2), None);
}

#[test]
fn renumber_drops_and_remaps() {
    let mut names = NameTable::new();
    names.insert("a", 2);
    names.insert("b", 4);
    names.renumber(|g| match g {
        2 => Some(1),
        _ => None,
    });
    assert_eq!(names.groups("a"), Some(&[1][..]));
    assert_eq!(names.groups("b"), None);
    assert_eq!(names.len(), 1);
}
