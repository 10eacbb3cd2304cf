use super::*;

#[test]
fn untouched_buffer_reproduces_the_source() {
    let buffer = EditBuffer::new("const a = 1;\nfoo(a);\n");
    assert_eq!(buffer.to_string(), "const a = 1;\nfoo(a);\n");
    assert!(!buffer.has_changed());
}

#[test]
fn remove_and_overwrite_use_original_offsets() {
    let mut buffer = EditBuffer::new("var answer = 42;");
    buffer.overwrite(4, 10, "x");
    buffer.remove(13, 15);
    assert_eq!(buffer.to_string(), "var x = ;");
    buffer.append_left(15, "1");
    assert_eq!(buffer.to_string(), "var x = 1;");
}

#[test]
fn left_and_right_insertions_attach_to_their_side() {
    let mut buffer = EditBuffer::new("abc");
    buffer.append_left(1, "<L>");
    buffer.prepend_right(1, "<R>");
    buffer.prepend_left(1, "<l>");
    buffer.append_right(1, "<r>");
    assert_eq!(buffer.to_string(), "a<l><L><R><r>bc");

    buffer.remove(1, 2);
    assert_eq!(buffer.to_string(), "a<l><L>c");
}

#[test]
fn insertions_at_the_edges_go_to_the_buffer_ends() {
    let mut buffer = EditBuffer::new("body");
    buffer.append_left(0, "(");
    buffer.prepend_right(4, ")");
    buffer.prepend("/* head */ ");
    buffer.append(";");
    assert_eq!(buffer.to_string(), "/* head */ (body);");
}

#[test]
fn overwrite_keeps_boundary_insertions() {
    let mut buffer = EditBuffer::new("a + b");
    buffer.append_right(4, "(");
    buffer.append_left(5, ")");
    buffer.overwrite(4, 5, "c");
    assert_eq!(buffer.to_string(), "a + (c)");
}

#[test]
fn edits_inside_replaced_text_are_ignored() {
    let mut buffer = EditBuffer::new("ns.member");
    buffer.overwrite(0, 9, "member$1");
    buffer.overwrite(0, 2, "other");
    assert_eq!(buffer.to_string(), "member$1");
}

#[test]
fn removing_a_removed_range_again_is_harmless() {
    let mut buffer = EditBuffer::new("if (true) {\n\tf();\n}");
    buffer.remove(0, 13);
    buffer.remove(4, 9);
    buffer.remove(17, 19);
    assert_eq!(buffer.to_string(), "f();");
}

#[test]
fn multibyte_boundaries_are_respected() {
    let mut buffer = EditBuffer::new("const é = 'ü';");
    buffer.overwrite(6, 8, "e$1");
    assert_eq!(buffer.to_string(), "const e$1 = 'ü';");
    buffer.remove(13, 14);
    assert_eq!(buffer.to_string(), "const e$1 = 'ü';");
}

#[test]
fn trimming_skips_blank_chunks() {
    let mut buffer = EditBuffer::new("\n\nfoo();\n\nbar();\n\n");
    buffer.remove(10, 17);
    buffer.trim();
    assert_eq!(buffer.to_string(), "foo();");

    let mut blank = EditBuffer::new("  \n\t");
    assert!(!blank.trim_start());
    assert!(blank.is_blank());
}

#[test]
fn indent_skips_the_first_line_when_asked() {
    let mut buffer = EditBuffer::new("a();\nif (x) {\n\tb();\n}\n");
    buffer.indent("\t", true);
    assert_eq!(buffer.to_string(), "\ta();\n\tif (x) {\n\t\tb();\n\t}\n");

    let mut rest = EditBuffer::new("a();\nb();");
    rest.indent("  ", false);
    assert_eq!(rest.to_string(), "a();\n  b();");
}

#[test]
fn indent_covers_inserted_text_and_skips_template_literals() {
    let mut buffer = EditBuffer::new("var s = `x\ny`;\nf();");
    buffer.exclude_from_indent(8, 14);
    buffer.append("\n\nvar ns = {\n\ta: a\n};");
    buffer.indent("\t", true);
    assert_eq!(
        buffer.to_string(),
        "\tvar s = `x\ny`;\n\tf();\n\n\tvar ns = {\n\t\ta: a\n\t};"
    );
}

#[test]
fn guessed_indent_prefers_tabs_on_ties() {
    assert_eq!(guess_indent("a\n\tb\n    c"), Some(String::from("\t")));
    assert_eq!(guess_indent("a\n    b\n  c"), Some(String::from("  ")));
    assert_eq!(guess_indent("a\nb"), None);
    assert_eq!(common_indent(["x", "y"]), "\t");
    assert_eq!(common_indent(["a\n  b", "c\n  d", "e\n\tf"]), "  ");
}

#[test]
fn anchors_are_sorted_and_unique() {
    let mut buffer = EditBuffer::new("abcdef");
    buffer.add_anchor(4);
    buffer.add_anchor(1);
    buffer.add_anchor(4);
    assert_eq!(buffer.anchors(), &[1, 4]);
}

#[test]
fn bundle_joins_sources_with_separators() {
    let mut bundle = BundleBuffer::new("\n\n");
    bundle.add_source(EditBuffer::new("a();"));
    bundle.add_source(EditBuffer::new("b();"));
    bundle.append("\n\nexport { a };");
    bundle.prepend("import x from 'x';\n\n");
    assert_eq!(
        bundle.to_string(),
        "import x from 'x';\n\na();\n\nb();\n\nexport { a };"
    );
}

#[test]
fn bundle_indent_indents_intro_and_every_source() {
    let mut bundle = BundleBuffer::new("\n\n");
    bundle.add_source(EditBuffer::new("a();"));
    bundle.add_source(EditBuffer::new("b();\nc();"));
    bundle.prepend("var x;\n\n");
    bundle.indent("\t");
    assert_eq!(bundle.to_string(), "\tvar x;\n\n\ta();\n\n\tb();\n\tc();");
}

#[test]
fn bundle_trim_reaches_past_blank_sources() {
    let mut bundle = BundleBuffer::new("\n\n");
    bundle.add_source(EditBuffer::new("\n  "));
    bundle.add_source(EditBuffer::new("\n\nfoo();\n"));
    bundle.trim();
    assert_eq!(bundle.to_string(), "\n\nfoo();");
    assert!(!bundle.is_blank());
}
