use super::*;

#[test]
fn replaces_only_the_content_region() {
    let xml = "<dm><meta>X</meta><content>A</content></dm>";
    assert_eq!(
        splice_content(xml, "<content>B</content>"),
        "<dm><meta>X</meta><content>B</content></dm>"
    );
}

#[test]
fn extracts_region_with_tags() {
    let xml = "<dm><idstatus/><content>\n  <para>A</para>\n</content><trailer/></dm>";
    assert_eq!(
        refinement_unit(xml),
        "<content>\n  <para>A</para>\n</content>"
    );
}

#[test]
fn splicing_region_with_itself_is_identity() {
    let documents = [
        "<dm><meta>X</meta><content>A</content></dm>",
        "<content></content>",
        "<?xml version=\"1.0\"?>\n<dmodule><content><procedure>é ✓</procedure></content></dmodule>\n",
        "<dm><content>first</content><content>second</content></dm>",
    ];
    for xml in documents {
        let unit = refinement_unit(xml).to_string();
        assert_eq!(splice_content(xml, &unit), xml);
    }
}

#[test]
fn bytes_outside_region_are_untouched() {
    let prefix = "<dmodule><identAndStatusSection>DMC-1</identAndStatusSection>";
    let suffix = "<!-- tail --></dmodule>";
    let xml = format!("{prefix}<content>old body</content>{suffix}");

    let spliced = splice_content(&xml, "<content>a much longer new body</content>");

    assert!(spliced.starts_with(prefix));
    assert!(spliced.ends_with(suffix));
    assert_eq!(
        &spliced[prefix.len()..spliced.len() - suffix.len()],
        "<content>a much longer new body</content>"
    );
}

#[test]
fn region_ends_at_first_closing_tag() {
    // Multiple content blocks are undefined upstream; the first block wins.
    let xml = "<dm><content>one</content><mid/><content>two</content></dm>";
    assert_eq!(refinement_unit(xml), "<content>one</content>");
    assert_eq!(
        splice_content(xml, "<content>ONE</content>"),
        "<dm><content>ONE</content><mid/><content>two</content></dm>"
    );
}

#[test]
fn missing_region_falls_back_to_whole_document() {
    let xml = "<dm><meta>X</meta><body>A</body></dm>";
    assert_eq!(content_region(xml), None);
    assert_eq!(refinement_unit(xml), xml);
    assert_eq!(splice_content(xml, "<dm>new</dm>"), "<dm>new</dm>");
}

#[test]
fn unterminated_region_falls_back_to_whole_document() {
    let xml = "<dm><content>A</dm>";
    assert_eq!(content_region(xml), None);
    assert_eq!(refinement_unit(xml), xml);
}

#[test]
fn attributes_on_content_do_not_match() {
    let xml = "<dm><content id=\"c1\">A</content></dm>";
    assert_eq!(content_region(xml), None);
}
