//! The closed set of drawable targets

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cat,
    Dog,
    House,
    Tree,
    Car,
    Apple,
    Banana,
    Clock,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Cat,
        Category::Dog,
        Category::House,
        Category::Tree,
        Category::Car,
        Category::Apple,
        Category::Banana,
        Category::Clock,
    ];

    /// Label as produced by the classifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cat => "cat",
            Category::Dog => "dog",
            Category::House => "house",
            Category::Tree => "tree",
            Category::Car => "car",
            Category::Apple => "apple",
            Category::Banana => "banana",
            Category::Clock => "clock",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Uniform draw, independent of earlier draws (repeats allowed)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Does a classifier label name this category?
    pub fn matches(&self, label: &str) -> bool {
        self.as_str() == label
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
