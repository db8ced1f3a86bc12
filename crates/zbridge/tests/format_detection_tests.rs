use zbridge::{Direction, Format, detect_format_from_path};

#[test]
fn detect_format_from_path_supports_extensions() {
    assert_eq!(detect_format_from_path("input.json"), Some(Format::Json));
    assert_eq!(detect_format_from_path("input.JSON"), Some(Format::Json));
    assert_eq!(detect_format_from_path("input.xml"), Some(Format::Xml));
    assert_eq!(detect_format_from_path("dir.d/input.Xml"), Some(Format::Xml));
}

#[test]
fn detect_format_from_path_returns_none_for_unknown_or_missing_extensions() {
    assert_eq!(detect_format_from_path("input"), None);
    assert_eq!(detect_format_from_path("input.txt"), None);
    assert_eq!(detect_format_from_path("input.yaml"), None);
}

#[test]
fn detected_formats_pick_a_direction() {
    let from = detect_format_from_path("order.xml");
    let to = detect_format_from_path("order.json");
    let direction = from.zip(to).and_then(|(from, to)| Direction::between(from, to));
    assert_eq!(direction, Some(Direction::XmlToJson));
}
