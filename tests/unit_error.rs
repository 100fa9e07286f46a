use std::path::PathBuf;

use tasklog::error::{exit_codes, Error, JsonError};
use tasklog::task::TaskStatus;

#[test]
fn exit_codes_map_correctly() {
    let user = Error::Validation("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let transition = Error::InvalidTransition {
        id: "01jh".to_string(),
        status: TaskStatus::Finished,
        action: "finish",
    };
    assert_eq!(transition.exit_code(), exit_codes::USER_ERROR);

    let corrupt = Error::StorageCorrupt {
        path: PathBuf::from("tasks.json"),
        reason: "bad json".to_string(),
    };
    assert_eq!(corrupt.exit_code(), exit_codes::STORAGE_CORRUPT);

    let write = Error::StorageWrite {
        path: PathBuf::from("tasks.json"),
        source: std::io::Error::other("disk full"),
    };
    assert_eq!(write.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code_and_kind() {
    let err = Error::NotFound("01jh".to_string());
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, "not_found");
    assert!(json.error.contains("Task not found"));
}

#[test]
fn transition_message_names_status() {
    let err = Error::InvalidTransition {
        id: "01jh".to_string(),
        status: TaskStatus::Finished,
        action: "finish",
    };
    assert_eq!(
        err.to_string(),
        "Cannot finish task 01jh: task is already finished"
    );
}
