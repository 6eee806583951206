//! Example prompts shown to help users get started, grouped by use case.

pub const DEFAULT_CATEGORY: &str = "Install Base Insights";

pub struct Category {
    pub name: &'static str,
    pub examples: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        name: DEFAULT_CATEGORY,
        examples: &[
            "How many systems are installed at this customer site?",
            "Which installed systems are past their end of service date?",
            "Summarize the install base by product line.",
        ],
    },
    Category {
        name: "Certification Status",
        examples: &[
            "Which engineers hold a valid certification for this product?",
            "List certifications expiring in the next 90 days.",
        ],
    },
    Category {
        name: "Service History",
        examples: &[
            "Show the last five service visits for this system.",
            "What were the most common failure codes last quarter?",
        ],
    },
];

/// Find a category by name, ignoring case and surrounding whitespace.
pub fn find(name: &str) -> Option<&'static Category> {
    let name = name.trim();
    CATEGORIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}
