//! Canonical gRPC status code names
//!
//! Steps refer to status codes by their upper-snake names
//! (`INVALID_ARGUMENT`), which `tonic::Code` does not parse on its own.

use tonic::Code;

const CODE_NAMES: [(&str, Code); 17] = [
    ("OK", Code::Ok),
    ("CANCELLED", Code::Cancelled),
    ("UNKNOWN", Code::Unknown),
    ("INVALID_ARGUMENT", Code::InvalidArgument),
    ("DEADLINE_EXCEEDED", Code::DeadlineExceeded),
    ("NOT_FOUND", Code::NotFound),
    ("ALREADY_EXISTS", Code::AlreadyExists),
    ("PERMISSION_DENIED", Code::PermissionDenied),
    ("RESOURCE_EXHAUSTED", Code::ResourceExhausted),
    ("FAILED_PRECONDITION", Code::FailedPrecondition),
    ("ABORTED", Code::Aborted),
    ("OUT_OF_RANGE", Code::OutOfRange),
    ("UNIMPLEMENTED", Code::Unimplemented),
    ("INTERNAL", Code::Internal),
    ("UNAVAILABLE", Code::Unavailable),
    ("DATA_LOSS", Code::DataLoss),
    ("UNAUTHENTICATED", Code::Unauthenticated),
];

/// Resolve a status name or numeric code to a `Code`
///
/// Returns `None` for anything outside the closed set, including numbers
/// past `UNAUTHENTICATED` that `Code::from_i32` would fold into `Unknown`.
pub fn code_from_name(name: &str) -> Option<Code> {
    let name = name.trim();
    if let Some((_, code)) = CODE_NAMES.iter().find(|(n, _)| *n == name) {
        return Some(*code);
    }
    match name.parse::<i32>() {
        Ok(n) if (0..CODE_NAMES.len() as i32).contains(&n) => Some(Code::from_i32(n)),
        _ => None,
    }
}

/// Canonical upper-snake name of a code
pub fn code_name(code: Code) -> &'static str {
    CODE_NAMES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(n, _)| *n)
        .unwrap_or("UNKNOWN")
}
