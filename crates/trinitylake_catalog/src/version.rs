#[cfg(test)]
#[path = "version_test.rs"]
mod version_test;

use std::fmt::Display;

// Width of a rendered root version. u64::MAX has 20 decimal digits, so zero
// padding to this width keeps lexicographic order equal to numeric order.
pub(crate) const ROOT_VERSION_WIDTH: usize = 20;

/// The position of a root node in the catalog lineage. Version 0 is written at
/// lakehouse creation and every commit publishes the successor of the version
/// it began from.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RootVersion(pub u64);

impl RootVersion {
    /// Returns the version a transaction beginning at `self` commits to.
    pub fn next(&self) -> RootVersion {
        RootVersion(self.0 + 1)
    }

    // Parses the file name component of a root path. Returns None for names
    // that are not exactly a zero-padded version, e.g. leftover temp files.
    pub(crate) fn from_file_name(name: &str) -> Option<RootVersion> {
        if name.len() != ROOT_VERSION_WIDTH || !name.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        name.parse().ok().map(RootVersion)
    }
}

impl Display for RootVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.0, width = ROOT_VERSION_WIDTH)
    }
}
