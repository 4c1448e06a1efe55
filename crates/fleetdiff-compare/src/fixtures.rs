//! Golden fixture naming convention.

use std::path::{Path, PathBuf};

/// Path of the golden fixture for a test config: same base name with the
/// extension replaced by `.expected`. The fixture holds the canonical
/// form of the policy and is checked into the repository.
pub fn expected_path(test_config_path: &Path) -> PathBuf {
    test_config_path.with_extension("expected")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_the_extension() {
        assert_eq!(
            expected_path(Path::new("policy-default.yml")),
            PathBuf::from("policy-default.expected")
        );
    }

    #[test]
    fn keeps_parent_directories() {
        assert_eq!(
            expected_path(Path::new("tests/policy/policy-vars.yaml")),
            PathBuf::from("tests/policy/policy-vars.expected")
        );
    }
}
