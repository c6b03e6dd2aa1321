use burrow::gopher::directory::Directory;
use burrow::gopher::item::{Item, ItemType};

fn sample() -> Directory {
    Directory::new(vec![
        Item::info("Welcome"),
        Item::new(ItemType::File, "About", "/about.txt").at("example.org", 70),
        Item::new(ItemType::Directory, "Docs", "/docs").at("example.org", 7070),
    ])
}

#[test]
fn test_to_text_keeps_order_without_terminator() {
    let text = sample().to_text();

    assert_eq!(
        text,
        b"iWelcome\t\terror.host\t1\r\n\
          0About\t/about.txt\texample.org\t70\r\n\
          1Docs\t/docs\texample.org\t7070\r\n"
    );
}

#[test]
fn test_empty_directory_encodes_to_nothing() {
    let dir = Directory::default();

    assert!(dir.is_empty());
    assert!(dir.to_text().is_empty());
}

#[test]
fn test_to_json_shape() {
    let dir = Directory::new(vec![
        Item::new(ItemType::File, "About", "/about.txt").at("example.org", 70),
    ]);

    let json: serde_json::Value = serde_json::from_slice(&dir.to_json().unwrap()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "items": [{
                "type": "0",
                "description": "About",
                "selector": "/about.txt",
                "host": "example.org",
                "port": 70,
                "extras": []
            }]
        })
    );
}

#[test]
fn test_json_round_trip() {
    let dir = sample();
    let decoded = Directory::from_json(&dir.to_json().unwrap()).unwrap();

    assert_eq!(decoded, dir);
}

#[test]
fn test_from_json_rejects_unknown_type() {
    let raw = br#"{"items":[{"type":"X","description":"","selector":"","host":"h","port":70}]}"#;
    assert!(Directory::from_json(raw).is_err());
}

#[test]
fn test_from_text_skips_bad_lines_and_stops_at_end() {
    let text = "iHello\t\terror.host\t1\r\n\
                Xbogus\t/x\thost\t70\r\n\
                \r\n\
                0Readme\t/readme\thost\t70\r\n\
                .\r\n\
                0After\t/after\thost\t70\r\n";

    let dir = Directory::from_text(text);

    assert_eq!(dir.len(), 2);
    let types: Vec<ItemType> = dir.iter().map(|i| i.item_type).collect();
    assert_eq!(types, vec![ItemType::Info, ItemType::File]);
}

#[test]
fn test_collect_into_directory() {
    let dir: Directory = (0..3)
        .map(|n| Item::info(format!("line {n}")))
        .collect();

    assert_eq!(dir.len(), 3);
    assert_eq!(dir.items[2].description, "line 2");
}
