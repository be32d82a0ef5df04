//! Report sink and raw record persistence tests.

use scholar_harvest::formatters::{ReportSink, load_raw_records, save_raw_records};
use scholar_harvest::models::{RawAuthors, RawCitations, ReportFormat};
use scholar_harvest::processing::YearRange;
use scholar_harvest::{Category, Publication, RawPublication};

fn publication(title: &str, year: i32, citations: u32, category: Category) -> Publication {
    Publication {
        title: title.to_lowercase(),
        display_title: title.to_string(),
        authors: vec!["A Smith".into(), "B Jones".into()],
        year: Some(year),
        venue: "Venue".into(),
        citations,
        category,
        ..Default::default()
    }
}

#[test]
fn test_single_csv_report() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ReportSink::new(dir.path(), ReportFormat::Csv, false);
    let range = YearRange::new(2015, 2020).ok();

    let pubs = [
        publication("Newer", 2020, 3, Category::Journal),
        publication("Older", 2016, 9, Category::Conference),
    ];
    let files = sink.write("Jane Doe", range, &pubs).unwrap();

    assert_eq!(
        files,
        vec![dir.path().join("Jane_Doe_publications_2015_2020.csv")]
    );
    let text = std::fs::read_to_string(&files[0]).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines[0], "year,citations,title,authors,venue,category");
    assert_eq!(lines[1], "2020,3,Newer,\"A Smith, B Jones\",Venue,journal");
    assert_eq!(
        lines[2],
        "2016,9,Older,\"A Smith, B Jones\",Venue,conference"
    );
}

#[test]
fn test_unclassified_report_has_no_category_column() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ReportSink::new(dir.path(), ReportFormat::Csv, false);

    let only = [publication("Only", 2020, 1, Category::Unclassified)];
    let files = sink.write("x", None, &only).unwrap();
    assert!(files[0].ends_with("x_publications_all.csv"));

    let text = std::fs::read_to_string(&files[0]).unwrap();
    assert!(text.starts_with("year,citations,title,authors,venue\n"));
}

#[test]
fn test_split_by_category_writes_one_file_per_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ReportSink::new(dir.path().join("nested"), ReportFormat::Markdown, true);
    let range = YearRange::new(2010, 2020).ok();

    let pubs = [
        publication("J1", 2020, 3, Category::Journal),
        publication("C1", 2019, 9, Category::Conference),
        publication("J2", 2018, 1, Category::Journal),
    ];
    let files = sink.write("lab", range, &pubs).unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "lab_journal_publications_2010_2020.md".to_string(),
            "lab_conference_publications_2010_2020.md".to_string(),
        ]
    );

    let journal = std::fs::read_to_string(&files[0]).unwrap();
    assert!(journal.contains("# lab journal publications (2010-2020)"));
    assert!(journal.contains("J1") && journal.contains("J2"));
    assert!(!journal.contains("C1"));
}

#[test]
fn test_json_report_is_valid_json() {
    let dir = tempfile::tempdir().unwrap();
    let sink = ReportSink::new(dir.path(), ReportFormat::Json, false);

    let other = [publication("T", 2020, 2, Category::Other)];
    let files = sink.write("p", None, &other).unwrap();
    let text = std::fs::read_to_string(&files[0]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value[0]["title"], "T");
    assert_eq!(value[0]["category"], "other");
    assert_eq!(value[0]["authors"][1], "B Jones");
}

#[test]
fn test_raw_records_survive_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw").join("jane_raw.json");

    let records = vec![
        RawPublication {
            title: "Deep Learning".into(),
            authors: RawAuthors::Joined("Y LeCun, Y Bengio".into()),
            year: "2015".into(),
            venue: "Nature".into(),
            citations: RawCitations::Text("42".into()),
            link: Some("https://example.org/dl".into()),
            source_type_hint: None,
        },
        RawPublication {
            title: "Sparse Models".into(),
            authors: RawAuthors::List(vec!["A Smith".into()]),
            year: "N/A".into(),
            citations: RawCitations::Missing,
            source_type_hint: Some("Journal Articles".into()),
            ..Default::default()
        },
    ];

    save_raw_records(&path, &records).unwrap();
    let loaded = load_raw_records(&path).unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn test_load_rejects_non_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"title": "not a list"}"#).unwrap();
    assert!(load_raw_records(&path).is_err());
}
