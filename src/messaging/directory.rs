/// Partners the active user has opened a thread with during this session.
///
/// Insertion-ordered and duplicate-free. Nothing is ever removed and nothing
/// is written to disk.
#[derive(Debug, Clone, Default)]
pub struct ConversationDirectory {
    partners: Vec<String>,
}

impl ConversationDirectory {
    /// Append `partner` unless already present. Returns whether it was new.
    pub fn insert(&mut self, partner: &str) -> bool {
        if self.contains(partner) {
            return false;
        }
        self.partners.push(partner.to_string());
        true
    }

    pub fn contains(&self, partner: &str) -> bool {
        self.partners.iter().any(|known| known == partner)
    }

    pub fn partners(&self) -> &[String] {
        &self.partners
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_without_duplicates() {
        let mut directory = ConversationDirectory::default();
        assert!(directory.insert("bob"));
        assert!(directory.insert("carol"));
        assert!(!directory.insert("bob"));
        assert!(!directory.insert("carol"));
        assert_eq!(directory.partners(), ["bob", "carol"]);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut directory = ConversationDirectory::default();
        directory.insert("bob");
        assert!(directory.insert("Bob"));
        assert!(directory.contains("Bob"));
        assert!(!directory.is_empty());
    }
}
