use lined::buffer::{Buffer, Cursor};

#[test]
fn test_save_then_load_round_trips_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");

    let buffer = Buffer::from_lines(["first", "", "  indented", "last"]);
    buffer.save_file(&path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "first\n\n  indented\nlast\n"
    );

    let mut loaded = Buffer::new();
    loaded.load_file(&path);
    assert_eq!(loaded.lines(), buffer.lines());
}

#[test]
fn test_missing_file_loads_as_single_empty_line() {
    let dir = tempfile::tempdir().unwrap();
    let mut buffer = Buffer::from_lines(["stale"]);
    buffer.load_file(&dir.path().join("absent.txt"));
    assert_eq!(buffer.lines(), &[String::new()]);
}

#[test]
fn test_empty_file_loads_as_single_empty_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "").unwrap();

    let mut buffer = Buffer::new();
    buffer.load_file(&path);
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.get(0), Some(""));
}

#[test]
fn test_load_keeps_cursor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("text.txt");
    std::fs::write(&path, "a\nb\n").unwrap();

    let mut buffer = Buffer::from_lines(["xyz"]).with_cursor(Cursor::at(0, 2));
    buffer.load_file(&path);
    assert_eq!(buffer.lines(), &["a", "b"]);
    assert_eq!(buffer.cursor(), Cursor::at(0, 2));
}
