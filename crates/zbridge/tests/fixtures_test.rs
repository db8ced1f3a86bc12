use std::fs;
use std::path::PathBuf;

use zbridge::{ErrorKind, xml_to_json};

fn fixture_files(kind: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(kind);
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "xml") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[test]
fn test_valid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let paths = fixture_files("valid")?;
    assert!(!paths.is_empty());
    for path in paths {
        let content = fs::read_to_string(&path)?;
        if let Err(err) = xml_to_json(&content) {
            return Err(
                std::io::Error::other(format!("Failed to convert valid file {path:?}: {err}"))
                    .into(),
            );
        }
    }
    Ok(())
}

#[test]
fn test_invalid_fixtures() -> Result<(), Box<dyn std::error::Error>> {
    let paths = fixture_files("invalid")?;
    assert!(!paths.is_empty());
    for path in paths {
        let content = fs::read_to_string(&path)?;
        match xml_to_json(&content) {
            Err(err) if matches!(err.kind(), ErrorKind::MalformedXml | ErrorKind::EmptyInput) => {}
            other => {
                return Err(std::io::Error::other(format!(
                    "Should fail to convert invalid file {path:?}, got {other:?}"
                ))
                .into());
            }
        }
    }
    Ok(())
}

#[test]
fn test_purchase_order_fixture_shape() -> Result<(), Box<dyn std::error::Error>> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/valid/purchase_order.xml");
    let value = xml_to_json(&fs::read_to_string(path)?)?;

    let order = value
        .as_object()
        .and_then(|o| o.get("PurchaseOrder"))
        .and_then(|v| v.as_object())
        .ok_or("missing PurchaseOrder")?;
    assert_eq!(order.get("@id").and_then(|v| v.as_string()), Some("PO-88213"));
    assert_eq!(order.get("Urgent").and_then(|v| v.as_bool()), Some(false));

    let items = order
        .get("Items")
        .and_then(|v| v.as_object())
        .and_then(|o| o.get("Item"))
        .and_then(|v| v.as_array())
        .ok_or("missing Item array")?;
    assert_eq!(items.len(), 2);
    let prices: Vec<_> = items
        .iter()
        .filter_map(|item| item.as_object()?.get("USPrice")?.as_number())
        .collect();
    assert_eq!(prices, vec![148.95, 39.98]);
    Ok(())
}

#[test]
fn test_mixed_content_fixture() -> Result<(), Box<dyn std::error::Error>> {
    let path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/valid/mixed_content.xml");
    let value = xml_to_json(&fs::read_to_string(path)?)?;
    assert_eq!(
        value.to_string(),
        r##"{"para":{"@lang":"en","#text":"Press  to continue → \"done\"","key":"Enter"}}"##
    );
    Ok(())
}
