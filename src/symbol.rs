use fxhash::FxBuildHasher;
use indexmap::IndexMap;

pub type FxMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Label -> 0-based line index, built once when the program is loaded.
#[derive(Debug, Default)]
pub struct LabelTable {
    table: FxMap<String, usize>,
}

impl LabelTable {
    /// Returns the line of the existing declaration if the label is already present.
    pub fn insert(&mut self, label: &str, line: usize) -> Result<(), usize> {
        if let Some(first) = self.table.get(label) {
            return Err(*first);
        }
        self.table.insert(label.to_string(), line);
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.table.get(label).copied()
    }
}

/// Name -> memory address, filled in by `name` instructions as they run.
#[derive(Debug, Default)]
pub struct SymbolTable {
    table: FxMap<String, usize>,
}

impl SymbolTable {
    /// A later `name` for the same symbol rebinds it.
    pub fn bind(&mut self, name: String, address: usize) {
        self.table.insert(name, address);
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.table.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let mut labels = LabelTable::default();
        assert_eq!(labels.insert("loop", 2), Ok(()));
        assert_eq!(labels.insert("end", 9), Ok(()));
        assert_eq!(labels.insert("loop", 5), Err(2));
        assert_eq!(labels.get("loop"), Some(2));
        assert_eq!(labels.get("end"), Some(9));
        assert_eq!(labels.get("nope"), None);
    }

    #[test]
    fn names_rebind() {
        let mut names = SymbolTable::default();
        names.bind("a".into(), 2);
        names.bind("a".into(), 4);
        assert_eq!(names.get("a"), Some(4));
        assert_eq!(names.get("b"), None);
    }
}
