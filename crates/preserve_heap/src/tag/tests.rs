use super::*;

#[test]
fn test_names_round_trip() {
    for tag in Tag::ALL {
        assert_eq!(Tag::from_name(tag.name()), Some(tag));
    }
}

#[test]
fn test_unknown_names() {
    assert_eq!(Tag::from_name("weakmap"), None);
    assert_eq!(Tag::from_name("Number"), None);
    assert_eq!(Tag::from_name(""), None);
}

#[test]
fn test_names_are_unique() {
    let mut names: Vec<_> = Tag::ALL.iter().map(|t| t.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), Tag::ALL.len());
}

#[test]
fn test_categories() {
    assert!(Tag::Number.is_primitive());
    assert!(Tag::NegZero.is_primitive());
    assert!(!Tag::Number.is_reference());

    assert!(Tag::Function.is_reference());
    assert!(!Tag::Function.is_container());
    assert!(!Tag::Symbol.is_primitive());

    assert!(Tag::Object.is_container());
    assert!(Tag::HtmlCollection.is_container());
    assert!(Tag::Map.is_reference());
}

#[test]
fn test_display() {
    assert_eq!(Tag::NegZero.to_string(), "neg0");
    assert_eq!(format!("{:?}", Tag::HtmlCollection), "Tag::htmlcollection");
}
