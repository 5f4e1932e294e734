use std::fmt;

/// The two link categories found on a help site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Navigation page linking to further topics and answers
    Topic,

    /// Leaf page whose body is harvested as an article
    Answer,
}

impl LinkKind {
    /// Path segment that identifies this kind (`/topic/<id>`, `/answer/<id>`)
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Answer => "answer",
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        self.path_segment()
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "topic" => Some(Self::Topic),
            "answer" => Some(Self::Answer),
            _ => None,
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_string() {
        assert_eq!(LinkKind::Topic.to_db_string(), "topic");
        assert_eq!(LinkKind::from_db_string("answer"), Some(LinkKind::Answer));
        assert_eq!(LinkKind::from_db_string("page"), None);
    }
}
