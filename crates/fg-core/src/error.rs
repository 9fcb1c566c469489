use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("degenerate {axis} axis: need at least two samples with finite, distinct endpoints")]
    DegenerateAxis { axis: char },
    #[error("domain is not rectilinear")]
    NotRectilinear,
    #[error("band field has no channels")]
    NoChannels,
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelCount { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn display_names_the_axis_and_sizes() {
        let e = Error::DegenerateAxis { axis: 'y' };
        assert!(e.to_string().starts_with("degenerate y axis"));

        let e = Error::SizeMismatch {
            expected: 16,
            actual: 15,
        };
        assert_eq!(e.to_string(), "size mismatch: expected 16, got 15");
    }
}
