use clap::Parser;
use jpq::{Args, CliError, read_document, run};
use std::io::Write;
use tempfile::NamedTempFile;

const STORE: &str = r#"{
    "store": {
        "book": [
            { "category": "reference", "author": "Nigel Rees", "title": "Sayings of the Century", "price": 8.95 },
            { "category": "fiction", "author": "Evelyn Waugh", "title": "Sword of Honour", "price": 12.99 },
            { "category": "fiction", "author": "Herman Melville", "title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99 },
            { "category": "fiction", "author": "J. R. R. Tolkien", "title": "The Lord of the Rings", "isbn": "0-395-19395-8", "price": 22.99 }
        ],
        "bicycle": { "color": "red", "price": 19.95 }
    },
    "expensive": 10
}"#;

fn document_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn args(path: &str, file: &NamedTempFile, flags: &[&str]) -> Args {
    let file = file.path().to_str().unwrap();
    let cli = ["jpq"].into_iter().chain(flags.iter().copied()).chain([path, file]);
    Args::try_parse_from(cli).unwrap()
}

fn select(path: &str, flags: &[&str]) -> Result<Vec<String>, CliError> {
    let file = document_file(STORE);
    let args = args(path, &file, flags);
    let document = read_document(&args)?;
    run(&args, &document)
}

#[test]
fn test_selects_from_file() {
    let titles = select("$.store.book[?(@.price < $.expensive)].title", &["-c"]).unwrap();
    assert_eq!(titles, vec![r#""Sayings of the Century""#, r#""Moby Dick""#]);
}

#[test]
fn test_scan_collects_every_price() {
    let prices = select("$..price", &["--compact"]).unwrap();
    assert_eq!(prices, vec!["8.95", "12.99", "8.99", "22.99", "19.95"]);
}

#[test]
fn test_regex_filter() {
    let authors = select("$.store.book[?(@.title =~ /^.*Sword.*$/)].author", &["-c"]).unwrap();
    assert_eq!(authors, vec![r#""Evelyn Waugh""#]);
}

#[test]
fn test_single_match() {
    let color = select("store.bicycle.color", &["-1", "-c"]).unwrap();
    assert_eq!(color, vec![r#""red""#]);

    let err = select("$..isbn", &["-1"]).unwrap_err();
    assert_eq!(err.to_string(), "Path returned multiple tokens.");
}

#[test]
fn test_strict_mode_fails_on_missing_member() {
    assert!(select("$.store.book[*].isbn", &[]).unwrap().len() == 2);

    let err = select("$.store.book[*].isbn", &["--strict"]).unwrap_err();
    assert_eq!(err.to_string(), "Property 'isbn' does not exist on JsonObject.");
}

#[test]
fn test_invalid_document_is_reported() {
    let file = document_file("{ \"a\": ");
    let err = read_document(&args("$.a", &file, &[])).unwrap_err();
    assert!(matches!(err, CliError::Json(_)));
    assert!(err.to_string().starts_with("Invalid JSON document: "));
}

#[test]
fn test_missing_file_is_reported() {
    let args = Args::try_parse_from(["jpq", "$.a", "/definitely/not/here.json"]).unwrap();
    assert!(matches!(read_document(&args), Err(CliError::Io(_))));
}

#[test]
fn test_syntax_error_is_reported() {
    let err = select("$.store.book[?(@.price <)]", &[]).unwrap_err();
    assert!(matches!(err, CliError::Path(ref e) if e.is_syntax()));
}
