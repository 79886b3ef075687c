use serde::Serialize;

/// Substrings that mark a test as exercising zarr or its storage stack.
pub const DEPENDENCY_KEYWORDS: [&str; 9] = [
    "zarr",
    "chunk",
    "codec",
    "storage",
    "blosc",
    "zlib",
    "gzip",
    "compression",
    "buffer",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    DependencyRelated,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorizedFailure {
    pub test: String,
    pub category: Category,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classified {
    pub dependency_related: Vec<String>,
    pub other: Vec<String>,
}

pub fn categorize(test: &str) -> Category {
    let lower = test.to_lowercase();
    if DEPENDENCY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Category::DependencyRelated
    } else {
        Category::Other
    }
}

/// Split failures into zarr-related and other, keeping input order within each group.
pub fn classify(failures: &[String]) -> Classified {
    let mut classified = Classified::default();
    for failure in failures {
        match categorize(failure) {
            Category::DependencyRelated => classified.dependency_related.push(failure.clone()),
            Category::Other => classified.other.push(failure.clone()),
        }
    }
    classified
}

/// Tag each failure with its category, in log order.
pub fn categorize_all(failures: &[String]) -> Vec<CategorizedFailure> {
    failures
        .iter()
        .map(|test| CategorizedFailure {
            test: test.clone(),
            category: categorize(test),
        })
        .collect()
}

/// `path/test_mod.py::TestClass::test_method` → `TestClass::test_method`
pub fn short_name(test: &str) -> String {
    let parts: Vec<&str> = test.split("::").collect();
    parts[parts.len().saturating_sub(2)..].join("::")
}
