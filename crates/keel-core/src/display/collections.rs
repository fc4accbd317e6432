//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::models::{Execution, Pattern, Plan};

macro_rules! collection {
    ($(#[$meta:meta])* $name:ident, $item:ty, $empty:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name(pub Vec<$item>);

        impl $name {
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn get(&self, index: usize) -> Option<&$item> {
                self.0.get(index)
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl From<Vec<$item>> for $name {
            fn from(items: Vec<$item>) -> Self {
                Self(items)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.0.is_empty() {
                    return writeln!(f, $empty);
                }
                for item in &self.0 {
                    write!(f, "{}", $crate::display::collections::Summary(item))?;
                }
                Ok(())
            }
        }
    };
}

/// Compact one-entry-per-item rendering used inside collections.
pub struct Summary<'a, T>(pub &'a T);

impl fmt::Display for Summary<'_, Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        match plan.id {
            Some(id) => writeln!(f, "## {} (ID: {id})", plan.intent)?,
            None => writeln!(f, "## {}", plan.intent)?,
        }
        writeln!(f)?;
        writeln!(f, "- **Description**: {}", plan.description)?;
        writeln!(f, "- **Steps**: {}", plan.steps.len())?;
        if let Some(updated_at) = &plan.updated_at {
            writeln!(f, "- **Updated**: {}", super::LocalDateTime(updated_at))?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Summary<'_, Pattern> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Summary<'_, Execution> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

collection!(
    /// Newtype wrapper for displaying a list of plans.
    ///
    /// ```rust
    /// use keel_core::{display::Plans, models::Plan};
    ///
    /// let plans = Plans(vec![Plan::new("code.fix_tests", "Fix failing tests")]);
    /// assert!(plans.to_string().contains("## code.fix_tests"));
    /// assert_eq!(Plans::default().to_string(), "No plans found.\n");
    /// ```
    Plans,
    Plan,
    "No plans found."
);

collection!(
    /// Newtype wrapper for displaying pattern statistics.
    Patterns,
    Pattern,
    "No patterns found."
);

collection!(
    /// Newtype wrapper for displaying execution history, most recent first.
    Executions,
    Execution,
    "No executions found."
);
