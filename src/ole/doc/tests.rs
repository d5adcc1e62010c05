//! End-to-end tests: open a synthetic document, edit it, write it, and open
//! the result again.
use super::fixtures::DocFixture;
use super::parts::bin_data::NilPicfAndBinData;
use super::parts::fib::{FLAG_ENCRYPTED, FibTable};
use super::writer::SprmBuilder;
use super::writer::section::generate_sepx;
use super::*;
use crate::common::error::Error;
use crate::ole::container::{Container, MemoryContainer};
use crate::ole::sprm_operations::*;
use bytes::Bytes;
use proptest::prelude::*;

fn grpprl(f: impl FnOnce(&mut SprmBuilder)) -> Vec<u8> {
    let mut builder = SprmBuilder::new();
    f(&mut builder);
    builder.build()
}

fn bold() -> Vec<u8> {
    grpprl(|b| b.add_bool(SPRM_C_F_BOLD, true))
}

fn open(container: &MemoryContainer) -> Document {
    Document::open(container, &DocOptions::default()).unwrap()
}

fn reopen(streams: OutputStreams) -> Document {
    let container = MemoryContainer::new()
        .with_entry(WORD_DOCUMENT_STREAM, streams.main)
        .with_entry(TABLE_STREAM_1, streams.table)
        .with_entry(DATA_STREAM, streams.data);
    open(&container)
}

fn round_trip(doc: &Document) -> Document {
    reopen(
        doc.to_streams(&PropertyBases::default(), &DocOptions::default())
            .unwrap(),
    )
}

/// "Hello " narrow after "w\u{00F6}rld\r" wide in the stream, bold over
/// "lo w\u{00F6}r", one centered paragraph, one section.
fn scattered() -> DocFixture {
    DocFixture::new()
        .piece("Hello ", 0x900, false)
        .piece("w\u{00F6}rld\r", 0x600, true)
        .chars(3, 9, bold())
        .paras(0, 12, 0, grpprl(|b| b.add_byte(SPRM_P_JC80, 1)))
        .section(0, 12, Some(generate_sepx(true, 2, 0)))
}

fn assert_same_properties(a: &Document, b: &Document) {
    let bases = PropertyBases::default();
    assert_eq!(a.text(), b.text());
    for cp in 0..a.pieces().total_cps() {
        assert_eq!(
            a.character_properties_at(cp, &bases).unwrap(),
            b.character_properties_at(cp, &bases).unwrap(),
            "character properties at {}",
            cp
        );
        assert_eq!(
            a.paragraph_properties_at(cp, &bases).unwrap(),
            b.paragraph_properties_at(cp, &bases).unwrap(),
            "paragraph properties at {}",
            cp
        );
    }
}

#[test]
fn test_open_scattered_pieces() {
    let doc = open(&scattered().build());
    let bases = PropertyBases::default();
    assert_eq!(doc.text(), "Hello w\u{00F6}rld\r");
    assert_eq!(doc.ccp_text(), 12);
    let bold_at: Vec<bool> = (0..12)
        .map(|cp| doc.character_properties_at(cp, &bases).unwrap().bold)
        .collect();
    assert_eq!(
        bold_at,
        vec![false, false, false, true, true, true, true, true, true, false, false, false]
    );
    assert_eq!(doc.paragraph_properties_at(11, &bases).unwrap().justification, 1);
    assert_eq!(doc.sections().count(), 1);
    assert_eq!(doc.fonts().name(0).as_deref(), Some("Times New Roman"));
    assert!(!doc.styles().is_empty());
    assert!(doc.dop().facing_pages());
    assert!(doc.lists().is_none());
}

#[test]
fn test_round_trip_preserves_every_table() {
    let doc = open(&scattered().build());
    let again = round_trip(&doc);

    assert_same_properties(&doc, &again);
    assert_eq!(again.ccp_text(), doc.ccp_text());
    assert_eq!(again.styles(), doc.styles());
    assert_eq!(again.fonts().count(), doc.fonts().count());
    assert_eq!(again.fonts().name(0), doc.fonts().name(0));
    assert_eq!(again.dop().as_bytes(), doc.dop().as_bytes());
    assert_eq!(
        again.sections().section_at(5).unwrap().sepx,
        doc.sections().section_at(5).unwrap().sepx
    );

    // Normalized layout: one contiguous run of text after the header block
    let pieces = again.pieces().pieces();
    assert_eq!(pieces[0].fc, Some(0x400));
    assert_eq!(pieces[1].fc, Some(0x406));
    assert_eq!(again.fib().fc_min(), 0x400);
    assert_eq!(again.fib().fc_mac(), 0x406 + 12);
    assert!(again.fib().which_table_stream());

    // Writing the rewritten document again is stable
    let streams = again
        .to_streams(&PropertyBases::default(), &DocOptions::default())
        .unwrap();
    let first = doc
        .to_streams(&PropertyBases::default(), &DocOptions::default())
        .unwrap();
    assert_eq!(streams, first);
}

#[test]
fn test_text_not_starting_at_zero() {
    let container = DocFixture::new()
        .cp_min(10)
        .piece("abcdef", 0x500, false)
        .chars(12, 14, bold())
        .paras(10, 16, 0, Vec::new())
        .section(10, 16, None)
        .build();
    let doc = open(&container);
    let bases = PropertyBases::default();
    assert_eq!(doc.pieces().cp_min(), 0);
    assert_eq!(doc.pieces().total_cps(), 6);
    assert!(!doc.character_properties_at(1, &bases).unwrap().bold);
    assert!(doc.character_properties_at(2, &bases).unwrap().bold);
    assert!(doc.character_properties_at(3, &bases).unwrap().bold);
    assert!(!doc.character_properties_at(4, &bases).unwrap().bold);
    let section = doc.sections().section_at(0).unwrap();
    assert_eq!((section.cp_start, section.cp_end), (0, 6));

    assert_same_properties(&doc, &round_trip(&doc));
}

#[test]
fn test_missing_streams() {
    assert!(matches!(
        Document::open(&MemoryContainer::new(), &DocOptions::default()),
        Err(Error::MissingStream(name)) if name == WORD_DOCUMENT_STREAM
    ));

    let mut container = scattered().build();
    container.remove_entry(TABLE_STREAM_1);
    assert!(matches!(
        Document::open(&container, &DocOptions::default()),
        Err(Error::MissingStream(name)) if name == TABLE_STREAM_1
    ));

    // Data is optional
    let doc = open(&scattered().build());
    assert!(doc.data_stream().is_empty());
}

#[test]
fn test_zero_table() {
    let container = scattered().zero_table().build();
    let doc = open(&container);
    assert!(!doc.fib().which_table_stream());
    assert_eq!(doc.text(), "Hello w\u{00F6}rld\r");

    let again = round_trip(&doc);
    assert!(again.fib().which_table_stream());
    assert_same_properties(&doc, &again);
}

#[test]
fn test_rejected_headers() {
    let container = scattered().flags(FLAG_ENCRYPTED).build();
    assert!(matches!(
        Document::open(&container, &DocOptions::default()),
        Err(Error::Unsupported(_))
    ));

    let mut container = scattered().build();
    let mut main = container.open_entry(WORD_DOCUMENT_STREAM).unwrap().to_vec();
    main[0] = 0x00;
    container.create_entry(WORD_DOCUMENT_STREAM, main).unwrap();
    assert!(matches!(
        Document::open(&container, &DocOptions::default()),
        Err(Error::InvalidFormat(_))
    ));

    let mut container = scattered().build();
    container
        .create_entry(WORD_DOCUMENT_STREAM, vec![0xEC, 0xA5, 0xC1, 0x00, 0, 0, 0, 0, 0, 0])
        .unwrap();
    assert!(matches!(
        Document::open(&container, &DocOptions::default()),
        Err(Error::TruncatedHeader { available: 10, .. })
    ));
}

#[test]
fn test_missing_clx() {
    let mut container = scattered().build();
    let main = container.open_entry(WORD_DOCUMENT_STREAM).unwrap();
    let mut fib = parts::fib::FileInformationBlock::parse(&main).unwrap();
    fib.set(FibTable::Clx, parts::fib::FcLcb::default()).unwrap();
    let mut main = main.to_vec();
    main[..fib.serialized_size()].copy_from_slice(fib.serialize());
    container.create_entry(WORD_DOCUMENT_STREAM, main).unwrap();
    assert!(matches!(
        Document::open(&container, &DocOptions::default()),
        Err(Error::MalformedTable { .. })
    ));
}

#[test]
fn test_allocation_limit_at_open() {
    let container = DocFixture::new()
        .piece("text\r", 0x400, false)
        .chars(0, 5, Vec::new())
        .section(0, 5, Some(vec![0u8; 40]))
        .build();
    let options = DocOptions {
        max_record_size: 32,
        ..Default::default()
    };
    assert!(matches!(
        Document::open(&container, &options),
        Err(Error::AllocationLimitExceeded {
            requested: 40,
            limit: 32
        })
    ));
}

#[test]
fn test_streams_padded_to_blocks() {
    let doc = open(&scattered().data(vec![7u8; 100]).build());
    let streams = doc
        .to_streams(&PropertyBases::default(), &DocOptions::default())
        .unwrap();
    assert_eq!(streams.main.len() % 4096, 0);
    assert_eq!(streams.table.len() % 4096, 0);
    assert_eq!(streams.data.len(), 4096);
    assert_eq!(&streams.data[..100], &[7u8; 100][..]);

    let small = DocOptions {
        block_size: 512,
        ..Default::default()
    };
    let streams = doc.to_streams(&PropertyBases::default(), &small).unwrap();
    assert_eq!(streams.main.len() % 512, 0);
    assert_eq!(streams.data.len(), 512);

    // A missing data stream still gets one zeroed block
    let streams = open(&scattered().build())
        .to_streams(&PropertyBases::default(), &DocOptions::default())
        .unwrap();
    assert_eq!(streams.data, vec![0u8; 4096]);
    let streams = open(&scattered().build())
        .to_streams(&PropertyBases::default(), &small)
        .unwrap();
    assert_eq!(streams.data.len(), 512);
}

#[test]
fn test_spans_follow_write_order() {
    let doc = open(&scattered().lists(&[1, 0, 0xAA, 0xBB], &[1, 0, 0, 0, 0xCC]).build());
    let streams = doc
        .to_streams(&PropertyBases::default(), &DocOptions::default())
        .unwrap();
    let kinds: Vec<FibTable> = streams.spans.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(kinds, FibTable::WRITE_ORDER.to_vec());

    let written: Vec<_> = streams
        .spans
        .iter()
        .filter(|(_, span)| span.lcb != 0)
        .collect();
    assert_eq!(written.len(), FibTable::WRITE_ORDER.len());
    assert!(written.windows(2).all(|w| w[0].1.fc < w[1].1.fc));
    assert_eq!(streams.span(FibTable::StyleSheet).unwrap().fc, 0);

    let again = reopen(streams.clone());
    for (kind, span) in &streams.spans {
        assert_eq!(again.fib().get(*kind), *span, "{}", kind.name());
    }
    let lists = again.lists().unwrap();
    assert_eq!(lists.list_count(), 1);
    assert_eq!(lists.override_count(), 1);
    assert_eq!(lists.list_data(), &[1, 0, 0xAA, 0xBB]);
}

#[test]
fn test_insert_follows_preceding_run() {
    let container = DocFixture::new()
        .piece("Hello world\r", 0x400, false)
        .chars(6, 11, bold())
        .paras(0, 12, 0, Vec::new())
        .section(0, 12, None)
        .build();
    let mut doc = open(&container);
    let bases = PropertyBases::default();

    assert_eq!(doc.apply_text_edit(6, 0, "big ").unwrap(), 4);
    assert_eq!(doc.text(), "Hello big world\r");
    assert_eq!(doc.ccp_text(), 16);
    assert!(!doc.character_properties_at(9, &bases).unwrap().bold);
    assert!(doc.character_properties_at(10, &bases).unwrap().bold);
    assert!(doc.character_properties_at(14, &bases).unwrap().bold);
    assert!(!doc.character_properties_at(15, &bases).unwrap().bold);
    assert!(doc.paragraph_properties_at(15, &bases).is_ok());
    assert_eq!(doc.sections().section_at(15).unwrap().cp_end, 16);

    let again = round_trip(&doc);
    assert_same_properties(&doc, &again);
    assert_eq!(again.ccp_text(), 16);
    assert_eq!(again.pieces().pieces().len(), 3);
}

#[test]
fn test_delete_shifts_runs() {
    let container = DocFixture::new()
        .piece("Hello world\r", 0x400, false)
        .chars(6, 11, bold())
        .paras(0, 12, 0, Vec::new())
        .build();
    let mut doc = open(&container);
    let bases = PropertyBases::default();

    assert_eq!(doc.apply_text_edit(0, 3, "").unwrap(), -3);
    assert_eq!(doc.text(), "lo world\r");
    assert_eq!(doc.ccp_text(), 9);
    assert!(!doc.character_properties_at(2, &bases).unwrap().bold);
    assert!(doc.character_properties_at(3, &bases).unwrap().bold);
    assert!(matches!(
        doc.character_properties_at(9, &bases),
        Err(Error::PositionNotFound { .. })
    ));
    assert_same_properties(&doc, &round_trip(&doc));

    // Removing the whole bold run drops it
    doc.apply_text_edit(3, 5, "").unwrap();
    assert_eq!(doc.text(), "lo \r");
    assert!((0..4).all(|cp| !doc.character_properties_at(cp, &bases).unwrap().bold));
}

#[test]
fn test_ccp_text_tracks_main_story() {
    // Main story is "Hello ", the rest belongs to a later story
    let fixture = DocFixture::new()
        .piece("Hello world\r", 0x400, false)
        .chars(0, 12, Vec::new())
        .ccp_text(6);
    let mut doc = open(&fixture.build());
    assert_eq!(doc.ccp_text(), 6);

    doc.apply_text_edit(8, 0, "xyz").unwrap();
    assert_eq!(doc.ccp_text(), 6);
    doc.apply_text_edit(2, 0, "xx").unwrap();
    assert_eq!(doc.ccp_text(), 8);
    // Removing across the end of the main story
    doc.apply_text_edit(4, 6, "ab").unwrap();
    assert_eq!(doc.ccp_text(), 6);
    assert_eq!(round_trip(&doc).ccp_text(), 6);
}

#[test]
fn test_edit_out_of_range() {
    let mut doc = open(&scattered().build());
    assert!(matches!(
        doc.apply_text_edit(10, 5, ""),
        Err(Error::PositionNotFound { .. })
    ));
    assert_eq!(doc.text(), "Hello w\u{00F6}rld\r");
}

#[test]
fn test_insert_into_empty_document() {
    let mut doc = open(&DocFixture::new().build());
    assert_eq!(doc.text(), "");
    doc.apply_text_edit(0, 0, "Hi\r").unwrap();
    let bases = PropertyBases::default();
    assert!(doc.character_properties_at(2, &bases).is_ok());
    assert!(doc.paragraph_properties_at(0, &bases).is_ok());

    let again = round_trip(&doc);
    assert_eq!(again.text(), "Hi\r");
    assert_eq!(again.ccp_text(), 3);
}

#[test]
fn test_huge_papx_round_trip() {
    let data = vec![0, 0, 0, 0, 3, 0, 0x05, 0x24, 0x01];
    let container = DocFixture::new()
        .piece("para\r", 0x400, false)
        .chars(0, 5, Vec::new())
        .paras(0, 5, 0, grpprl(|b| b.add_dword(SPRM_P_HUGE_PAPX, 4)))
        .data(data.clone())
        .build();
    let doc = open(&container);
    let bases = PropertyBases::default();
    assert!(doc.paragraph_properties_at(0, &bases).unwrap().keep);

    let again = round_trip(&doc);
    assert!(again.paragraph_properties_at(4, &bases).unwrap().keep);
    assert_eq!(&again.data_stream()[..data.len()], &data[..]);
}

#[test]
fn test_bin_data_at() {
    let mut data = vec![0xEE; 3];
    data.extend(NilPicfAndBinData::new(Bytes::from_static(b"payload")).serialize());
    let picture = grpprl(|b| {
        b.add_bool(SPRM_C_F_SPEC, true);
        b.add_bool(SPRM_C_F_DATA, true);
        b.add_dword(SPRM_C_PIC_LOCATION, 3);
    });
    // fData without fSpec is not an anchor
    let plain = grpprl(|b| {
        b.add_bool(SPRM_C_F_DATA, true);
        b.add_dword(SPRM_C_PIC_LOCATION, 3);
    });
    let container = DocFixture::new()
        .piece("\u{1}x\r", 0x400, false)
        .chars(0, 1, picture)
        .chars(1, 2, plain)
        .data(data)
        .build();
    let doc = open(&container);
    let bases = PropertyBases::default();

    let record = doc.bin_data_at(0, &bases).unwrap().unwrap();
    assert_eq!(record.payload(), b"payload");
    assert_eq!(record.header_mismatch(), None);
    assert_eq!(doc.bin_data_at(1, &bases).unwrap(), None);
}

#[test]
fn test_recompress_round_trip() {
    let noisy = grpprl(|b| {
        b.add_bool(SPRM_C_F_BOLD, true);
        b.add_bool(SPRM_C_F_ITALIC, false);
        b.add_bool(SPRM_C_F_BOLD, true);
    });
    let container = DocFixture::new()
        .piece("abcdef\r", 0x400, false)
        .chars(0, 4, noisy)
        .paras(0, 7, 0, Vec::new())
        .build();
    let doc = open(&container);
    let options = DocOptions {
        recompress_properties: true,
        ..Default::default()
    };
    let again = reopen(doc.to_streams(&PropertyBases::default(), &options).unwrap());
    assert_same_properties(&doc, &again);
    assert_eq!(again.characters().run_at(0).unwrap().grpprl, &bold()[..]);
}

#[test]
fn test_package_save() {
    let mut package = Package::new(scattered().zero_table().build());
    let mut doc = package.document().unwrap();
    doc.apply_text_edit(0, 0, "Oh, ").unwrap();
    package.save(&doc, &PropertyBases::default()).unwrap();

    let entries = package.container().list_entries();
    assert!(entries.contains(WORD_DOCUMENT_STREAM));
    assert!(entries.contains(TABLE_STREAM_1));
    assert!(entries.contains(DATA_STREAM));
    assert_eq!(package.container().open_entry(DATA_STREAM).unwrap().len(), 4096);

    let saved = package.document().unwrap();
    assert_eq!(saved.text(), "Oh, Hello w\u{00F6}rld\r");
    assert!(saved.fib().which_table_stream());
    assert_same_properties(&doc, &saved);
}

#[derive(Debug, Clone)]
struct Edit {
    start: usize,
    removed: usize,
    inserted: String,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    (0usize..64, 0usize..8, "[a-z\u{00E9}\u{4E2D} ]{0,6}").prop_map(|(start, removed, inserted)| {
        Edit {
            start,
            removed,
            inserted,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_edits_keep_tables_consistent(edits in prop::collection::vec(edit_strategy(), 1..8)) {
        let mut doc = open(&scattered().build());
        let mut model: Vec<u16> = doc.text().encode_utf16().collect();
        let bases = PropertyBases::default();

        for edit in edits {
            let start = edit.start.min(model.len());
            let removed = edit.removed.min(model.len() - start);
            doc.apply_text_edit(start as u32, removed as u32, &edit.inserted).unwrap();
            model.splice(start..start + removed, edit.inserted.encode_utf16());

            let total = doc.pieces().total_cps();
            prop_assert_eq!(total as usize, model.len());
            prop_assert_eq!(doc.characters().plcf().end(), total.max(doc.characters().plcf().start()));
            for cp in 0..total {
                prop_assert!(doc.character_properties_at(cp, &bases).is_ok());
                prop_assert!(doc.paragraph_properties_at(cp, &bases).is_ok());
            }
        }

        prop_assert_eq!(doc.text(), String::from_utf16_lossy(&model));
        let again = round_trip(&doc);
        prop_assert_eq!(again.text(), doc.text());
        prop_assert_eq!(again.ccp_text(), doc.ccp_text());
    }
}
