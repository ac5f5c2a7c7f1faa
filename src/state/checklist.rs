use indexmap::IndexMap;

/// Pre-run checklist: ordered items with a done flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Checklist {
    items: IndexMap<String, bool>,
}

impl Checklist {
    /// Build a checklist with every item pending.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(|item| (item.into(), false)).collect(),
        }
    }

    /// Items in insertion order.
    pub fn items(&self) -> &IndexMap<String, bool> {
        &self.items
    }

    /// Add a pending item; returns `false` when it already exists.
    pub fn add(&mut self, item: String) -> bool {
        if self.items.contains_key(&item) {
            return false;
        }
        self.items.insert(item, false);
        true
    }

    /// Remove an item; returns whether it existed.
    pub fn remove(&mut self, item: &str) -> bool {
        self.items.shift_remove(item).is_some()
    }

    /// Flip an item, returning its new flag.
    pub fn toggle(&mut self, item: &str) -> Option<bool> {
        let done = self.items.get_mut(item)?;
        *done = !*done;
        Some(*done)
    }

    /// Mark every item pending again.
    pub fn reset(&mut self) {
        self.items.values_mut().for_each(|done| *done = false);
    }

    /// Whether every item is done. An empty checklist is never done.
    pub fn is_done(&self) -> bool {
        !self.items.is_empty() && self.items.values().all(|done| *done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_every_item_completes_checklist() {
        let mut checklist = Checklist::new(["mic check", "layout"]);
        assert!(!checklist.is_done());
        assert_eq!(checklist.toggle("mic check"), Some(true));
        assert!(!checklist.is_done());
        assert_eq!(checklist.toggle("layout"), Some(true));
        assert!(checklist.is_done());
        assert_eq!(checklist.toggle("unknown"), None);
    }

    #[test]
    fn reset_clears_flags_but_keeps_items() {
        let mut checklist = Checklist::new(["a", "b"]);
        checklist.toggle("a");
        checklist.reset();
        assert_eq!(checklist.items().len(), 2);
        assert!(checklist.items().values().all(|done| !done));
    }

    #[test]
    fn add_and_remove_preserve_order() {
        let mut checklist = Checklist::new(["a", "b"]);
        assert!(checklist.add("c".into()));
        assert!(!checklist.add("a".into()));
        assert!(checklist.remove("b"));
        assert!(!checklist.remove("b"));
        let keys: Vec<_> = checklist.items().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert!(!Checklist::default().is_done());
    }
}
