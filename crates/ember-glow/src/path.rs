use std::fmt;

/// An ordered sequence of non-negative integers identifying one element in a
/// device tree. Dot-separated in string form (`"1.2.3"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<u32>);

impl Path {
    pub fn root(number: u32) -> Self {
        Path(vec![number])
    }

    pub fn from_numbers(numbers: Vec<u32>) -> Self {
        Path(numbers)
    }

    pub fn numbers(&self) -> &[u32] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, number: u32) -> Path {
        let mut numbers = self.0.clone();
        numbers.push(number);
        Path(numbers)
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        Some(Path(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn last(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// True if `self` is `other` or a descendant of `other`.
    pub fn is_at_or_under(&self, other: &Path) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }

    pub fn parse(s: &str) -> Option<Path> {
        if s.is_empty() {
            return Some(Path(Vec::new()));
        }
        let mut numbers = Vec::new();
        for part in s.split('.') {
            numbers.push(part.parse().ok()?);
        }
        Some(Path(numbers))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let path = Path::parse("1.2.3").unwrap();
        assert_eq!(path.to_string(), "1.2.3");
        assert_eq!(path.numbers(), &[1, 2, 3]);
    }

    #[test]
    fn child_and_parent() {
        let root = Path::root(1);
        let child = root.child(2);
        assert_eq!(child.to_string(), "1.2");
        assert_eq!(child.parent().unwrap(), root);
    }

    #[test]
    fn ancestor_check() {
        let a = Path::parse("1.2").unwrap();
        let b = Path::parse("1.2.3").unwrap();
        assert!(b.is_at_or_under(&a));
        assert!(a.is_at_or_under(&a));
        assert!(!a.is_at_or_under(&b));
    }
}
