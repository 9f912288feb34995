//! Displacement statistics for occupied slots

/// Summary of how far stored entries sit from their home slot.
///
/// Displacement is the number of forward steps (wrapping) between the slot a key hashes
/// to and the slot it actually occupies. A successful lookup examines
/// `displacement + 1` slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeStats {
    /// Number of occupied slots that were measured
    pub entries: usize,
    /// Sum of the displacements of all entries
    pub total_displacement: usize,
    /// Largest displacement of any single entry
    pub max_displacement: usize,
}

impl ProbeStats {
    /// Adds one entry with the given displacement
    pub(crate) fn record(&mut self, displacement: usize) {
        self.entries = self.entries.saturating_add(1);
        self.total_displacement = self.total_displacement.saturating_add(displacement);
        self.max_displacement = self.max_displacement.max(displacement);
    }

    /// Average displacement per entry, `0.0` for an empty table
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn mean_displacement(&self) -> f64 {
        if self.entries == 0 {
            return 0.0;
        }
        self.total_displacement as f64 / self.entries as f64
    }
}
