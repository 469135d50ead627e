//! Named positions for seeking

use rustc_hash::FxHashMap;
use std::cell::OnceCell;

/// A label and the position it marks
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub name: String,
    pub position: f64,
}

/// A seek destination: a raw position or a label name
#[derive(Clone, Debug, PartialEq)]
pub enum Seek {
    Position(f64),
    Label(String),
}

impl From<f64> for Seek {
    fn from(position: f64) -> Self {
        Seek::Position(position)
    }
}

impl From<i32> for Seek {
    fn from(position: i32) -> Self {
        Seek::Position(position as f64)
    }
}

impl From<&str> for Seek {
    fn from(label: &str) -> Self {
        Seek::Label(label.to_string())
    }
}

impl From<String> for Seek {
    fn from(label: String) -> Self {
        Seek::Label(label)
    }
}

/// Label table with a lazily built, position-sorted view
#[derive(Clone, Debug, Default)]
pub struct LabelTable {
    labels: FxHashMap<String, f64>,
    sorted: OnceCell<Vec<Label>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or move a label
    pub fn insert(&mut self, name: impl Into<String>, position: f64) {
        self.labels.insert(name.into(), position);
        self.sorted = OnceCell::new();
    }

    /// Replace every label
    pub fn replace<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(|(n, p)| (n.into(), p)).collect();
        self.sorted = OnceCell::new();
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels ordered by position
    pub fn sorted(&self) -> &[Label] {
        self.sorted.get_or_init(|| {
            let mut list: Vec<Label> = self
                .labels
                .iter()
                .map(|(name, &position)| Label {
                    name: name.clone(),
                    position,
                })
                .collect();
            list.sort_by(|a, b| {
                a.position
                    .total_cmp(&b.position)
                    .then_with(|| a.name.cmp(&b.name))
            });
            list
        })
    }

    /// The label on or immediately before `position`
    pub fn at(&self, position: f64) -> Option<&str> {
        self.sorted()
            .iter()
            .take_while(|label| label.position <= position)
            .last()
            .map(|label| label.name.as_str())
    }

    /// Resolve a seek destination; `None` if the label is unknown
    pub fn resolve(&self, seek: &Seek) -> Option<f64> {
        match seek {
            Seek::Position(p) => Some(*p),
            Seek::Label(name) => self.get(name),
        }
    }
}
