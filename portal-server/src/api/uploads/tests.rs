use super::handler::is_safe_filename;

#[test]
fn traversal_attempts_are_rejected() {
    assert!(!is_safe_filename("../secrets.json"));
    assert!(!is_safe_filename("..\\windows"));
    assert!(!is_safe_filename("a/../../etc/passwd"));
    assert!(!is_safe_filename("sub/dir.pdf"));
    assert!(!is_safe_filename(""));
    assert!(!is_safe_filename("."));
}

#[test]
fn plain_filenames_are_accepted() {
    assert!(is_safe_filename("passport_1756400000000.pdf"));
    assert!(is_safe_filename("report (final).docx"));
    assert!(is_safe_filename("img.png"));
}
