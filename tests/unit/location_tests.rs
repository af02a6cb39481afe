//! Unit tests for location parsing and prefix normalization

use lograte::services::location::{Location, normalize_prefix};
use lograte::Error;

#[test]
fn parse_bucket_and_prefix() {
    let location = Location::parse("s3://access-logs/2024/10").unwrap();
    assert_eq!(location.scheme, "s3");
    assert_eq!(location.bucket, "access-logs");
    assert_eq!(location.prefix, "2024/10/");
    assert_eq!(location.to_string(), "s3://access-logs/2024/10/");
}

#[test]
fn parse_bucket_only() {
    for input in ["s3://logs", "s3://logs/", "store://logs//"] {
        let location: Location = input.parse().unwrap();
        assert_eq!(location.bucket, "logs");
        assert_eq!(location.prefix, "", "input {input}");
    }
}

#[test]
fn rejects_invalid_locations() {
    for input in ["logs/2024", "gs://logs", "s3://", "s3:///prefix", ""] {
        assert!(
            matches!(Location::parse(input), Err(Error::InvalidInput(_))),
            "expected rejection of {input:?}"
        );
    }
}

#[test]
fn normalize_prefix_cases() {
    assert_eq!(normalize_prefix(""), "");
    assert_eq!(normalize_prefix("/"), "");
    assert_eq!(normalize_prefix("a"), "a/");
    assert_eq!(normalize_prefix("a/b///"), "a/b/");
}
