//! Column width solving.
//!
//! Four sizing policies distribute the available width across columns:
//!
//! - `EqualWidths`: every column gets the same fractional share.
//! - `CustomWidths`: per-column specs from the layout delegate; fractional
//!   entries are rescaled to the space left after fixed columns and gaps.
//! - `FitVisibleContent` / `FitAllContent`: shares proportional to the widest
//!   measured content per column.

use serde::{Deserialize, Serialize};

use crate::column::ColumnId;
use crate::error::LayoutError;
use crate::identity::{ItemId, RowId, item_id};

/// Policy governing how available width is distributed across columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizingMode {
    #[default]
    EqualWidths,
    CustomWidths,
    FitVisibleContent,
    /// Measures every rendered row, not just the visible ones. This costs
    /// one host measurement per cell in the table and can be slow for large
    /// tables.
    FitAllContent,
}

impl SizingMode {
    /// Whether this mode depends on measured content.
    pub fn measures_content(self) -> bool {
        matches!(self, Self::FitVisibleContent | Self::FitAllContent)
    }
}

/// Width of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthSpec {
    /// Exact width in host units.
    Absolute(f64),
    /// Initial width the host may adjust after measuring.
    Estimated(f64),
    /// Share of the container width.
    FractionalWidth(f64),
    /// Share of the container height. Never valid for a column width.
    FractionalHeight(f64),
}

impl WidthSpec {
    fn fixed_width(self) -> Option<f64> {
        match self {
            Self::Absolute(w) | Self::Estimated(w) => Some(w),
            _ => None,
        }
    }

    pub fn fraction(self) -> Option<f64> {
        match self {
            Self::FractionalWidth(f) => Some(f),
            _ => None,
        }
    }
}

/// What a layout's fractional shares are a share of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FractionBasis {
    /// The full container width. Custom layouts already folded fixed columns
    /// and gaps into their fractions.
    Available,
    /// The width left after fixed columns and gaps, split in proportion.
    #[default]
    Remaining,
}

/// Computed layout: one width per column in ordinal order, plus spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDescription<C: ColumnId> {
    pub columns: Vec<(C, WidthSpec)>,
    pub spacing: f64,
    pub basis: FractionBasis,
}

impl<C: ColumnId> LayoutDescription<C> {
    pub fn width(&self, column: C) -> Option<WidthSpec> {
        self.columns
            .get(column.ordinal())
            .filter(|(c, _)| *c == column)
            .map(|(_, spec)| *spec)
    }

    /// Sum of all fractional shares.
    pub fn fraction_total(&self) -> f64 {
        self.columns.iter().filter_map(|(_, s)| s.fraction()).sum()
    }

    /// Concrete widths for a container of the given width.
    ///
    /// Fixed columns keep their width. Fractional columns take `f * available`
    /// under [`FractionBasis::Available`], or split what is left after fixed
    /// columns and spacing in proportion to their fractions otherwise.
    pub fn resolve(&self, available: f64) -> Vec<f64> {
        let gaps = self.spacing * self.columns.len().saturating_sub(1) as f64;
        let fixed: f64 = self
            .columns
            .iter()
            .filter_map(|(_, s)| s.fixed_width())
            .sum();
        let remaining = (available - gaps - fixed).max(0.0);
        let fractions = self.fraction_total();

        self.columns
            .iter()
            .map(|(_, spec)| match (spec, self.basis) {
                (WidthSpec::Absolute(w) | WidthSpec::Estimated(w), _) => *w,
                (WidthSpec::FractionalWidth(f), FractionBasis::Available) => f * available,
                (WidthSpec::FractionalWidth(f), FractionBasis::Remaining) if fractions > 0.0 => {
                    remaining * f / fractions
                }
                _ => 0.0,
            })
            .collect()
    }
}

/// Measured content width at one (row, column) position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement<C: ColumnId> {
    pub row: RowId,
    pub column: C,
    pub width: Option<f64>,
}

/// Pure width solver for a given container width and inter-column gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthSolver {
    pub available_width: f64,
    pub gap: f64,
}

impl WidthSolver {
    pub fn new(available_width: f64, gap: f64) -> Self {
        Self {
            available_width,
            gap,
        }
    }

    fn check<C: ColumnId>(&self) -> Result<usize, LayoutError> {
        let n = C::count();
        if n == 0 {
            return Err(LayoutError::NoColumns);
        }
        if self.available_width.is_nan() || self.available_width <= 0.0 {
            return Err(LayoutError::NoAvailableWidth(self.available_width));
        }
        Ok(n)
    }

    fn describe<C: ColumnId>(
        &self,
        basis: FractionBasis,
        widths: impl Iterator<Item = WidthSpec>,
    ) -> LayoutDescription<C> {
        LayoutDescription {
            columns: C::ALL.iter().copied().zip(widths).collect(),
            spacing: self.gap,
            basis,
        }
    }

    /// Every column gets `1 / n` of the width.
    pub fn equal_widths<C: ColumnId>(&self) -> Result<LayoutDescription<C>, LayoutError> {
        let n = self.check::<C>()?;
        let share = 1.0 / n as f64;
        Ok(self.describe(
            FractionBasis::Remaining,
            std::iter::repeat_n(WidthSpec::FractionalWidth(share), n),
        ))
    }

    /// Caller-supplied widths with fractional entries rescaled to the real
    /// remaining space.
    pub fn custom_widths<C: ColumnId>(
        &self,
        spec_for: impl Fn(C) -> WidthSpec,
    ) -> Result<LayoutDescription<C>, LayoutError> {
        let n = self.check::<C>()?;
        let specs: Vec<WidthSpec> = C::ALL.iter().map(|c| spec_for(*c)).collect();

        if let Some(pos) = specs
            .iter()
            .position(|s| matches!(s, WidthSpec::FractionalHeight(_)))
        {
            return Err(LayoutError::height_fraction(C::ALL[pos]));
        }

        let fixed: f64 = specs.iter().filter_map(|s| s.fixed_width()).sum();
        let gaps = self.gap * (n - 1) as f64;
        let budget = self.available_width - gaps - fixed;
        if budget <= 0.0 {
            return Err(LayoutError::Infeasible {
                fixed,
                available: self.available_width,
            });
        }

        let scale = budget / self.available_width;
        log::trace!("custom widths: fixed={fixed} budget={budget} scale={scale}");

        let specs = specs.into_iter().map(|spec| match spec {
            WidthSpec::FractionalWidth(f) => WidthSpec::FractionalWidth(f * scale),
            other => other,
        });
        Ok(self.describe(FractionBasis::Available, specs))
    }

    /// Shares proportional to the widest measured content per column.
    ///
    /// Positions the host could not measure count as `available / n`. A
    /// column with no positions at all gets the same fallback.
    pub fn fit_content<C: ColumnId>(
        &self,
        measurements: &[Measurement<C>],
    ) -> Result<LayoutDescription<C>, LayoutError> {
        let n = self.check::<C>()?;
        let fallback = self.available_width / n as f64;

        let mut maxima: Vec<Option<f64>> = vec![None; n];
        for m in measurements {
            let width = m.width.unwrap_or(fallback);
            let slot = &mut maxima[m.column.ordinal()];
            *slot = Some(slot.map_or(width, |current| current.max(width)));
        }

        let maxima: Vec<f64> = maxima.into_iter().map(|m| m.unwrap_or(fallback)).collect();
        let total: f64 = maxima.iter().sum();
        if total <= 0.0 {
            log::debug!("fit content: all columns measured empty, using equal widths");
            return self.equal_widths();
        }

        Ok(self.describe(
            FractionBasis::Remaining,
            maxima
                .into_iter()
                .map(|max| WidthSpec::FractionalWidth(max / total)),
        ))
    }

    /// Solve for `mode`.
    ///
    /// `spec_for` is consulted only under `CustomWidths`; when absent, custom
    /// mode falls back to equal widths. `measurements` is consulted only by
    /// the fit modes.
    pub fn solve<C: ColumnId>(
        &self,
        mode: SizingMode,
        spec_for: Option<&dyn Fn(C) -> WidthSpec>,
        measurements: &[Measurement<C>],
    ) -> Result<LayoutDescription<C>, LayoutError> {
        match mode {
            SizingMode::EqualWidths => self.equal_widths(),
            SizingMode::CustomWidths => match spec_for {
                Some(spec_for) => self.custom_widths(spec_for),
                None => {
                    log::debug!("custom widths requested without a layout delegate");
                    self.equal_widths()
                }
            },
            SizingMode::FitVisibleContent | SizingMode::FitAllContent => {
                self.fit_content(measurements)
            }
        }
    }
}

/// Collect measurements for the given positions through `measure`.
pub fn measure_positions<C: ColumnId>(
    positions: impl IntoIterator<Item = (RowId, C)>,
    mut measure: impl FnMut(ItemId) -> Option<f64>,
) -> Vec<Measurement<C>> {
    positions
        .into_iter()
        .map(|(row, column)| Measurement {
            row,
            column,
            width: measure(item_id(row, column)),
        })
        .collect()
}
