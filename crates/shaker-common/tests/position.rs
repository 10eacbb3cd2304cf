use super::*;

#[test]
fn locate_maps_offsets_to_lines_and_columns() {
    let map = LineMap::build("const a = 1;\nfoo();\n\nbar();");
    assert_eq!(map.locate(0), Location { line: 1, column: 0 });
    assert_eq!(map.locate(6), Location { line: 1, column: 6 });
    assert_eq!(map.locate(13), Location { line: 2, column: 0 });
    assert_eq!(map.locate(21), Location { line: 4, column: 0 });
    assert_eq!(map.line_count(), 4);
}

#[test]
fn locate_past_end_stays_on_last_line() {
    let map = LineMap::build("a\nb");
    assert_eq!(map.locate(40).line, 2);
}

#[test]
fn ascii_offsets_are_identity() {
    let offsets = Utf16Offsets::new("let x = 1;");
    assert_eq!(offsets.to_byte(4), 4);
    assert_eq!(offsets.to_byte(100), 10);
}

#[test]
fn utf16_offsets_account_for_multibyte_and_surrogates() {
    // 'é' is one UTF-16 unit but two bytes; '😀' is two units and four bytes.
    let source = "'é';'😀';x";
    let offsets = Utf16Offsets::new(source);
    assert_eq!(offsets.to_byte(3), 4);
    assert_eq!(offsets.to_byte(4), 5);
    assert_eq!(offsets.to_byte(8), 11);
    assert_eq!(offsets.to_byte(9), 12);
    assert_eq!(&source[12..], "x");
}
