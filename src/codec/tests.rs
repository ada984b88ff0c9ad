//! Tests for profile parsing and writing.

use super::*;
use rstest::rstest;
use std::io::{self, Cursor};

fn parse(text: &str) -> Result<ParsedProfile, CovError> {
    parse_profiles(Cursor::new(text), Path::new("cover.out"))
}

fn render(set: &ProfileSet) -> String {
    let mut buf = Vec::new();
    write_profiles(set, &mut buf).expect("write to memory");
    String::from_utf8(buf).expect("utf-8 output")
}

fn set_from(text: &str) -> ProfileSet {
    let mut set = ProfileSet::new();
    set.absorb(parse(text).expect("parse profile"))
        .expect("absorb profile");
    set
}

#[test]
fn parses_header_and_groups_by_path() {
    let parsed = parse(
        "mode: count\n\
         b.go:3.1,4.2 1 0\n\
         a.go:7.1,8.1 2 5\n\
         b.go:1.1,2.1 1 9\n",
    )
    .expect("parse");

    assert_eq!(parsed.mode, Some(CountingMode::Count));
    let paths: Vec<&str> = parsed.files.iter().map(FileProfile::path).collect();
    assert_eq!(paths, vec!["a.go", "b.go"]);
    let b = parsed.files.get(1).expect("b.go profile");
    assert_eq!(
        b.ranges(),
        &[
            Range::new(Position::new(1, 1), Position::new(2, 1), 1, 9),
            Range::new(Position::new(3, 1), Position::new(4, 2), 1, 0),
        ]
    );
}

#[test]
fn path_may_contain_colons() {
    let parsed = parse("mode: set\nC:/src/app/main.go:10.2,12.3 2 1\n").expect("parse");
    let file = parsed.files.first().expect("one file");
    assert_eq!(file.path(), "C:/src/app/main.go");
    assert_eq!(file.ranges().len(), 1);
}

#[test]
fn repeated_ranges_in_one_input_are_combined() {
    let parsed = parse("mode: count\nf.go:1.1,2.1 1 2\nf.go:1.1,2.1 1 3\n").expect("parse");
    let file = parsed.files.first().expect("one file");
    assert_eq!(file.ranges().first().map(|r| r.hits), Some(5));
}

#[test]
fn repeated_range_with_other_statement_count_is_rejected() {
    let err = parse("mode: set\nf.go:1.1,2.1 1 1\nf.go:1.1,2.1 2 1\n").expect_err("reject");
    assert!(matches!(
        err,
        CovError::InconsistentStatements { previous: 1, .. }
    ));
}

#[test]
fn empty_input_has_no_mode() {
    let parsed = parse("").expect("parse empty");
    assert_eq!(parsed, ParsedProfile::default());
}

#[test]
fn header_only_input_has_mode_and_no_files() {
    let parsed = parse("mode: atomic\n").expect("parse header");
    assert_eq!(parsed.mode, Some(CountingMode::Atomic));
    assert!(parsed.files.is_empty());
}

#[rstest]
#[case::missing_header("f.go:1.1,2.1 1 1\n", 1)]
#[case::bare_header("mode: \n", 1)]
#[case::bad_position("mode: set\nf.go:1,2.1 1 1\n", 2)]
#[case::missing_count("mode: set\nf.go:1.1,2.1 1\n", 2)]
#[case::negative_count("mode: set\nf.go:1.1,2.1 1 -1\n", 2)]
#[case::late_garbage("mode: set\nf.go:1.1,2.1 1 1\nnot a range\n", 3)]
fn malformed_lines_report_position(#[case] text: &str, #[case] expected_line: usize) {
    let err = parse(text).expect_err("reject malformed profile");
    match err {
        CovError::Parse { line, path, .. } => {
            assert_eq!(line, expected_line);
            assert_eq!(path, Path::new("cover.out"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn unknown_mode_is_unsupported() {
    let err = parse("mode: sometimes\n").expect_err("reject mode");
    assert_eq!(err.to_string(), "unsupported covermode: sometimes");
}

#[test]
fn write_emits_header_then_ranges_in_order() {
    let set = set_from("mode: set\nb.go:5.1,6.1 1 0\na.go:1.1,2.1 1 1\n");
    assert_eq!(
        render(&set),
        "mode: set\na.go:1.1,2.1 1 1\nb.go:5.1,6.1 1 0\n"
    );
}

#[test]
fn written_profile_parses_back_to_same_set() {
    let text = "mode: count\n\
                pkg/a.go:1.13,3.2 2 4\n\
                pkg/a.go:3.2,5.10 1 0\n\
                pkg/b.go:10.1,10.40 3 17\n";
    let set = set_from(text);

    let rendered = render(&set);

    assert_eq!(rendered, text);
    assert_eq!(set_from(&rendered), set);
}

#[test]
fn empty_set_writes_nothing() {
    assert_eq!(render(&ProfileSet::new()), "");
}

#[test]
fn read_profile_names_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.out");

    let err = read_profile(&path).expect_err("missing file");

    match err {
        CovError::Io { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("expected io error, got {other:?}"),
    }
}

/// Accepts `budget` bytes, then fails every write.
struct ShortWriter {
    written: Vec<u8>,
    budget: usize,
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.budget.saturating_sub(self.written.len());
        if room == 0 {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "device full"));
        }
        let take = room.min(buf.len());
        self.written.extend(buf.iter().take(take));
        Ok(take)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[rstest]
#[case::in_header(4)]
#[case::in_ranges(20)]
fn write_failure_aborts_serialization(#[case] budget: usize) {
    let set = set_from("mode: count
a.go:1.1,2.1 1 1
b.go:1.1,2.1 1 2
");
    let mut out = ShortWriter {
        written: Vec::new(),
        budget,
    };

    let err = write_profiles(&set, &mut out).expect_err("short write");

    assert_eq!(err.kind(), io::ErrorKind::StorageFull);
    assert_eq!(out.written.len(), budget);
}
