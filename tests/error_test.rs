use std::io;
use std::path::PathBuf;

use launchpad::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid metadata".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid metadata.");

    let err = Error::TemplateError("rendering failed".to_string());
    assert_eq!(err.to_string(), "Template error: rendering failed.");

    let err = Error::CommandError {
        command: "git push -u origin feature/x".to_string(),
        status: 1,
        stderr: "rejected".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Command 'git push -u origin feature/x' failed with status 1: rejected"
    );
}

#[test]
fn test_filesystem_error_carries_path() {
    let err = Error::fs(
        PathBuf::from("svc/app/main.py"),
        io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    );
    match &err {
        Error::FileSystemError { path, .. } => assert_eq!(path, &PathBuf::from("svc/app/main.py")),
        _ => panic!("Expected FileSystemError variant"),
    }
    assert!(err.to_string().contains("svc/app/main.py"));
    assert!(!err.is_command_error());
}
