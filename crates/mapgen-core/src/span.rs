pub type SourceId = u32;

/// Half-open byte range inside one user source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub source: SourceId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(source: SourceId, start: u32, end: u32) -> Span {
        Span { source, start, end }
    }

    /// Span of something that has no concrete source location.
    pub fn dummy() -> Span {
        Span::default()
    }

    pub fn is_dummy(&self) -> bool {
        *self == Span::default()
    }

    /// Smallest span covering both `self` and `other`. Only meaningful
    /// within the same source.
    pub fn to(&self, other: Span) -> Span {
        Span {
            source: self.source,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}..{}", self.source, self.start, self.end)
    }
}
