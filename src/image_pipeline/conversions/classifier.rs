/// Substring that marks a ground-truth file.
pub const TRUTH_MARKER: &str = "groundtruth";
/// Substring that marks a four-channel input file.
pub const INPUT_MARKER: &str = "input";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Single-channel ground truth
    Truth,
    /// R, G, B plus depth
    Input,
}

impl FileKind {
    /// Classifies a file by name. Truth wins when both markers are present;
    /// `None` means the file is not part of the dataset.
    pub fn classify(file_name: &str) -> Option<Self> {
        if file_name.contains(TRUTH_MARKER) {
            Some(FileKind::Truth)
        } else if file_name.contains(INPUT_MARKER) {
            Some(FileKind::Input)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(FileKind::classify("0001_groundtruth.exr"), Some(FileKind::Truth));
        assert_eq!(FileKind::classify("0001_input.exr"), Some(FileKind::Input));
        assert_eq!(FileKind::classify("input_groundtruth.exr"), Some(FileKind::Truth));
        assert_eq!(FileKind::classify("notes.txt"), None);
        assert_eq!(FileKind::classify("0001_GroundTruth.exr"), None);
    }
}
