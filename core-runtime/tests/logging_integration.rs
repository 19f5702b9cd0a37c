//! Integration tests for logging system

use core_runtime::logging::{init_logging, strip_path, LogFormat, LogLevel, LoggingConfig};

#[test]
fn test_config_builder_roundtrip() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Trace)
        .with_spans(false);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Trace);
    assert!(!config.enable_spans);
    assert!(config.filter.is_none());
}

#[test]
fn test_path_stripping() {
    // Local cache files
    assert_eq!(
        strip_path("/home/user/.cache/playback-core/3f9a.mp3"),
        "3f9a.mp3"
    );
    assert_eq!(strip_path("C:\\Users\\John\\AppData\\song.mp3"), "song.mp3");

    // Remote track URLs
    assert_eq!(strip_path("https://cdn.example.com/audio/intro.m4a"), "intro.m4a");

    // Edge cases
    assert_eq!(strip_path("filename.txt"), "filename.txt");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_second_initialization_fails() {
    // Only one global subscriber can be installed per process
    let first = init_logging(LoggingConfig::default().with_format(LogFormat::Json));
    assert!(first.is_ok());

    let second = init_logging(LoggingConfig::default());
    assert!(matches!(second, Err(core_runtime::Error::Config(_))));
}
