//! Column identifiers.

use std::fmt::Debug;
use std::hash::Hash;

/// A closed, ordered enumeration of table columns.
///
/// Implementors must list every member in `ALL`, in display order, and
/// `ordinal` must return each member's position in that list. The set and
/// its order are fixed for the lifetime of a table.
///
/// The [`grid_columns!`](crate::grid_columns) macro generates a conforming
/// enum.
///
/// # Example
///
/// ```
/// tabgrid::grid_columns! {
///     pub enum Planet {
///         Name,
///         Radius,
///         Moons,
///     }
/// }
///
/// use tabgrid::ColumnId;
/// assert_eq!(Planet::count(), 3);
/// assert_eq!(Planet::Radius.ordinal(), 1);
/// assert_eq!(Planet::from_ordinal(2), Some(Planet::Moons));
/// ```
pub trait ColumnId: Copy + Eq + Hash + Debug + Send + 'static {
    /// Every member, in ordinal order.
    const ALL: &'static [Self];

    /// Dense zero-based position of this column.
    fn ordinal(self) -> usize;

    /// Number of columns.
    fn count() -> usize {
        Self::ALL.len()
    }

    /// Look up a column by ordinal.
    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }
}

/// Declare a column enumeration and implement [`ColumnId`] for it.
///
/// Variants take their ordinal from declaration order, so explicit
/// discriminants are not accepted.
#[macro_export]
macro_rules! grid_columns {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::ColumnId for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn ordinal(self) -> usize {
                self as usize
            }
        }
    };
}
