//! Task parameter validation.

use tracing::error;

use crate::error::ValidationError;
use crate::message::TaskType;

/// Blank means empty once control characters and ASCII spaces (`<= U+0020`)
/// are stripped from both ends. Other Unicode whitespace is content.
fn is_blank(value: &str) -> bool {
    value.trim_matches(|c: char| c <= ' ').is_empty()
}

/// Check a job's parameters, returning the supported task type.
///
/// Rules are applied in order: job id present and non-blank, task type
/// present and non-blank, task type exactly `"export"`. A rejection is
/// logged with its reason.
pub fn check_task_parameters(
    job_id: Option<&str>,
    task_type: Option<&str>,
) -> Result<TaskType, ValidationError> {
    let checked = if job_id.is_none_or(is_blank) {
        Err(ValidationError::MissingJobId)
    } else {
        match task_type {
            Some(t) if !is_blank(t) => TaskType::from_wire(t)
                .ok_or_else(|| ValidationError::UnsupportedTaskType(t.to_string())),
            _ => Err(ValidationError::MissingTaskType),
        }
    };

    if let Err(err) = &checked {
        error!(job_id = ?job_id, task_type = ?task_type, error = %err, "task parameters rejected");
    }
    checked
}

/// Boolean form of [`check_task_parameters`].
pub fn validate(job_id: Option<&str>, task_type: Option<&str>) -> bool {
    check_task_parameters(job_id, task_type).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_export() {
        assert!(validate(Some("J1"), Some("export")));
        assert_eq!(
            check_task_parameters(Some("J1"), Some("export")),
            Ok(TaskType::Export)
        );
    }

    #[test]
    fn rejects_missing_or_blank_job_id() {
        for job_id in [None, Some(""), Some("   "), Some("\t\n")] {
            assert!(!validate(job_id, Some("export")));
            assert_eq!(
                check_task_parameters(job_id, Some("export")),
                Err(ValidationError::MissingJobId)
            );
        }
    }

    #[test]
    fn rejects_missing_or_blank_task_type() {
        for task_type in [None, Some(""), Some("  ")] {
            assert!(!validate(Some("J1"), task_type));
            assert_eq!(
                check_task_parameters(Some("J1"), task_type),
                Err(ValidationError::MissingTaskType)
            );
        }
    }

    #[test]
    fn rejects_unsupported_task_types() {
        for task_type in ["report", "EXPORT", "Export", "export "] {
            assert!(!validate(Some("J1"), Some(task_type)));
            assert_eq!(
                check_task_parameters(Some("J1"), Some(task_type)),
                Err(ValidationError::UnsupportedTaskType(task_type.to_string()))
            );
        }
    }

    #[test]
    fn blank_means_control_characters_and_spaces() {
        assert!(!validate(Some("\u{0001}"), Some("export")));
        assert!(!validate(Some(" \u{001f}\r "), Some("export")));
        assert!(validate(Some("\u{00A0}"), Some("export")));
        assert!(validate(Some("\u{2003}"), Some("export")));
        assert_eq!(
            check_task_parameters(Some("J1"), Some("\u{0000}")),
            Err(ValidationError::MissingTaskType)
        );
    }

    #[test]
    fn job_id_is_checked_first() {
        assert_eq!(
            check_task_parameters(Some(""), Some("report")),
            Err(ValidationError::MissingJobId)
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any non-blank job id with the export task type is accepted.
        #[test]
        fn non_blank_job_ids_are_accepted(job_id in "[a-zA-Z0-9_-]{1,32}") {
            prop_assert!(validate(Some(&job_id), Some("export")));
        }

        /// Property: validation is total and only "export" is ever accepted.
        #[test]
        fn only_export_is_accepted(
            job_id in proptest::option::of(".*"),
            task_type in proptest::option::of(".*"),
        ) {
            let accepted = validate(job_id.as_deref(), task_type.as_deref());
            let expected = job_id.as_deref().is_some_and(|id| !is_blank(id))
                && task_type.as_deref() == Some("export");
            prop_assert_eq!(accepted, expected);
        }
    }
}
