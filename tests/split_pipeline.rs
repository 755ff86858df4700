//! End-to-end chapter-split tests over real (generated) PDFs.
//!
//! PDFs are built in-memory with lopdf: each page carries its printed page
//! number as the first text run, followed by filler text, so the visible
//! page number detector has something realistic to chew on.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;
use studyforge::extract::open_bytes;
use studyforge::split::{
    detect_visible_pages, dedup_and_sort, interpolate, map_to_physical, split_prepared,
    ChapterEntry, PageMap,
};

/// Build a PDF whose pages each show the given text lines.
fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for line in text.lines() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-16).into()]));
        }
        operations.push(Operation::new("ET", vec![]));
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("save test PDF");
    buf
}

/// A six-page book: a cover without digits, then pages printed 5–9.
fn sample_book() -> Vec<u8> {
    text_pdf(&[
        "Cover Without Numbers",
        "5\nChapter one begins here with some filler prose.",
        "6\nMore of chapter one.",
        "7\nChapter two begins here.",
        "8\nMore of chapter two.",
        "9\nThe end.",
    ])
}

#[test]
fn detector_maps_printed_numbers_to_physical_indices() {
    let pdf = open_bytes(&sample_book(), Path::new("book.pdf")).unwrap();
    let map = detect_visible_pages(&pdf.doc);

    // The cover contributes nothing; printed 5..=9 live at physical 1..=5.
    assert_eq!(map.get(&5), Some(&1));
    assert_eq!(map.get(&9), Some(&5));
    assert_eq!(map.len(), 5);
}

#[test]
fn detector_first_claim_wins_on_duplicate_printed_numbers() {
    let bytes = text_pdf(&["7\nfirst claimant", "7\nsecond claimant", "8\nnext"]);
    let pdf = open_bytes(&bytes, Path::new("dup.pdf")).unwrap();
    let map = detect_visible_pages(&pdf.doc);
    assert_eq!(map.get(&7), Some(&0));
    assert_eq!(map.get(&8), Some(&2));
}

#[test]
fn detected_map_interpolates_cleanly() {
    let pdf = open_bytes(&sample_book(), Path::new("book.pdf")).unwrap();
    let detected = detect_visible_pages(&pdf.doc);
    let full = interpolate(&detected, 100);
    // Already dense; interpolation is the identity here.
    assert_eq!(full, detected);
}

#[test]
fn full_split_writes_ordered_chapter_files() {
    let out = tempfile::tempdir().unwrap();
    let pdf = open_bytes(&sample_book(), Path::new("algebra.pdf")).unwrap();

    let entries = vec![
        ChapterEntry {
            title: "2. Second".into(),
            page: 7,
        },
        ChapterEntry {
            title: "1. First".into(),
            page: 5,
        },
    ];

    let output = split_prepared(&pdf, entries, None, 100, out.path()).unwrap();

    assert_eq!(output.chapters.len(), 2);
    assert_eq!(output.chapters[0].title, "1. First");
    assert_eq!(output.chapters[0].index, 1);
    assert_eq!(output.chapters[1].index, 3);

    let dir = out.path().join("algebra");
    assert_eq!(
        output.files,
        vec![dir.join("01_1. First.pdf"), dir.join("02_2. Second.pdf")]
    );

    // Chapter 1 covers physical [1, 3); chapter 2 runs to the end: [3, 6).
    let ch1 = Document::load(&output.files[0]).unwrap();
    assert_eq!(ch1.get_pages().len(), 2);
    let ch2 = Document::load(&output.files[1]).unwrap();
    assert_eq!(ch2.get_pages().len(), 3);
}

#[test]
fn colliding_physical_pages_yield_an_empty_first_chapter() {
    let out = tempfile::tempdir().unwrap();
    let pdf = open_bytes(&sample_book(), Path::new("tiny.pdf")).unwrap();

    let entries = vec![
        ChapterEntry {
            title: "A".into(),
            page: 5,
        },
        ChapterEntry {
            title: "B".into(),
            page: 6,
        },
    ];
    // Both visible pages forced onto the same physical index.
    let page_map: PageMap = [(5u32, 2usize), (6, 2)].into_iter().collect();

    let output = split_prepared(&pdf, entries, Some(page_map), 100, out.path()).unwrap();

    // A covers [2, 2): empty but still written, not rejected.
    let a = Document::load(&output.files[0]).unwrap();
    assert_eq!(a.get_pages().len(), 0);
    let b = Document::load(&output.files[1]).unwrap();
    assert_eq!(b.get_pages().len(), 4);
}

#[test]
fn hostile_titles_produce_safe_filenames_on_disk() {
    let out = tempfile::tempdir().unwrap();
    let pdf = open_bytes(&sample_book(), Path::new("odd.pdf")).unwrap();

    let entries = vec![ChapterEntry {
        title: r#"Intro: "Basics"?!"#.into(),
        page: 5,
    }];

    let output = split_prepared(&pdf, entries, None, 100, out.path()).unwrap();
    let name = output.files[0].file_name().unwrap().to_string_lossy();
    assert_eq!(name, "01_Intro_ _Basics___.pdf");
    assert!(output.files[0].exists());
}

#[test]
fn unmapped_chapters_are_dropped_before_slicing() {
    let out = tempfile::tempdir().unwrap();
    let pdf = open_bytes(&sample_book(), Path::new("sparse.pdf")).unwrap();

    let entries = vec![
        ChapterEntry {
            title: "Mapped".into(),
            page: 6,
        },
        ChapterEntry {
            title: "Phantom".into(),
            page: 400,
        },
    ];

    let output = split_prepared(&pdf, entries, None, 100, out.path()).unwrap();
    assert_eq!(output.chapters.len(), 1);
    assert_eq!(output.chapters[0].title, "Mapped");
}

#[test]
fn no_mappable_chapters_is_a_typed_error() {
    let out = tempfile::tempdir().unwrap();
    let pdf = open_bytes(&sample_book(), Path::new("none.pdf")).unwrap();

    let entries = vec![ChapterEntry {
        title: "Phantom".into(),
        page: 4_000,
    }];

    let err = split_prepared(&pdf, entries, None, 100, out.path()).unwrap_err();
    assert!(matches!(err, studyforge::ForgeError::NoChaptersMapped));
}

#[test]
fn dedup_and_mapping_compose_with_detection() {
    let pdf = open_bytes(&sample_book(), Path::new("compose.pdf")).unwrap();
    let map = interpolate(&detect_visible_pages(&pdf.doc), 100);

    let entries = dedup_and_sort(vec![
        ChapterEntry {
            title: "Old Title".into(),
            page: 8,
        },
        ChapterEntry {
            title: "New Title".into(),
            page: 8,
        },
        ChapterEntry {
            title: "Opener".into(),
            page: 5,
        },
    ]);
    let chapters = map_to_physical(&entries, &map);

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].title, "Opener");
    assert_eq!(chapters[1].title, "New Title");
    assert_eq!(chapters[1].index, 4);
}
