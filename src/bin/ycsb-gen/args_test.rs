const DATA: &str = include_str!("args_test.in");

use std::path::PathBuf;

use crate::args::{parse_ycsb_gen_args, ParseResult, YcsbGenArgs};

#[test]
fn test_example_sets() {
    let mut success_count = 0;
    let mut failure_count = 0;

    for (i, s) in DATA.lines().enumerate() {
        let s = s.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        match parse_ycsb_gen_args(s.split_ascii_whitespace(), false) {
            Some(_) => success_count += 1,
            None => {
                eprintln!("  line {}: {}", i + 1, s);
                failure_count += 1;
            }
        }
    }

    println!("Successes: {success_count}, failures: {failure_count}");
    assert_eq!(failure_count, 0);
}

#[test]
fn test_invalid_sets() {
    let cases = [
        "ycsb-gen",
        "ycsb-gen -P",
        "ycsb-gen -P a.spec -F",
        "ycsb-gen -P a.spec -o",
        "ycsb-gen -p",
        "ycsb-gen -p recordcount",
        "ycsb-gen -p =10",
        "ycsb-gen -P a.spec --threads 4",
        "ycsb-gen -P a.spec extra",
        "ycsb-gen --query_only",
        "ycsb-gen -o out",
    ];

    for case in cases {
        assert!(
            parse_ycsb_gen_args(case.split_ascii_whitespace(), false).is_none(),
            "{} was accepted",
            case
        );
    }
}

fn parse(s: &str) -> YcsbGenArgs {
    match parse_ycsb_gen_args(s.split_ascii_whitespace(), false) {
        Some(ParseResult::Config(args)) => *args,
        _ => panic!("{} was not parsed into a config", s),
    }
}

#[test]
fn test_parsed_values() {
    let args = parse("ycsb-gen -P a.spec -P b.spec -F keys.txt -o out --query_only -p x=1");
    assert_eq!(
        args.property_files,
        vec![PathBuf::from("a.spec"), PathBuf::from("b.spec")]
    );
    assert_eq!(args.dataset_file, Some(PathBuf::from("keys.txt")));
    assert_eq!(args.dataset_output(), PathBuf::from("out/dataset.dat"));
    assert_eq!(args.query_output(), PathBuf::from("out/query.dat"));
    assert!(args.query_only);
    assert_eq!(args.overrides, vec![("x".to_owned(), "1".to_owned())]);

    let args = parse("ycsb-gen -p readproportion=1");
    assert_eq!(args.output_dir, PathBuf::from("."));
    assert!(!args.query_only);
    assert_eq!(args.dataset_file, None);
}

#[test]
fn test_property_precedence() {
    let dir = tempfile::TempDir::new().unwrap();
    let first = dir.path().join("first.spec");
    let second = dir.path().join("second.spec");
    std::fs::write(&first, "recordcount=10\noperationcount=20\nreadproportion=1\n").unwrap();
    std::fs::write(&second, "operationcount=30\ndataset_file=from_file.txt\n").unwrap();

    let line = format!(
        "ycsb-gen -P {} -P {} -p operationcount=40 -F from_flag.txt",
        first.display(),
        second.display()
    );
    let props = parse(&line).load_properties().unwrap();
    assert_eq!(props.get("recordcount"), Some("10"));
    assert_eq!(props.get("operationcount"), Some("40"));
    assert_eq!(props.get("readproportion"), Some("1"));
    assert_eq!(props.get("dataset_file"), Some("from_flag.txt"));

    let missing = parse("ycsb-gen -P /nonexistent/workload.spec");
    assert!(missing.load_properties().is_err());
}

#[test]
fn test_special_commands() {
    assert!(matches!(
        parse_ycsb_gen_args("ycsb-gen --version".split_ascii_whitespace(), false),
        Some(ParseResult::VersionDisplayed)
    ));
    assert!(matches!(
        parse_ycsb_gen_args("ycsb-gen -h".split_ascii_whitespace(), false),
        Some(ParseResult::HelpDisplayed)
    ));
}
