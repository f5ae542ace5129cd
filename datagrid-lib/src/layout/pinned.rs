//! Pinned column offsets and stacking

use crate::model::ColumnDefinition;
use crate::model::PinSide;

use super::ColumnLayout;

impl ColumnLayout {
    /// Returns the sticky offset of a pinned column.
    ///
    /// Left-pinned columns are offset by the widths of the left-pinned columns
    /// before them; right-pinned columns by the widths of the right-pinned
    /// columns after them. `None` for unpinned or unknown columns.
    pub fn pinned_offset(&self, key: &str) -> Option<f32> {
        let index = self.columns.iter().position(|c| c.key == key)?;
        let column = &self.columns[index];

        let offset = match column.pinned {
            PinSide::None => return None,
            PinSide::Left => self.columns[..index]
                .iter()
                .filter(|c| c.pinned == PinSide::Left)
                .map(|c| self.fixed_width(c))
                .sum(),
            PinSide::Right => self.columns[index + 1..]
                .iter()
                .rev()
                .filter(|c| c.pinned == PinSide::Right)
                .map(|c| self.fixed_width(c))
                .sum(),
        };
        Some(offset)
    }

    /// Returns the stacking priority of a column.
    ///
    /// Pinned columns nearer the scroll edge stack above those further in;
    /// unpinned columns sit at 1.
    pub fn z_index(&self, key: &str) -> u32 {
        let Some(index) = self.columns.iter().position(|c| c.key == key) else {
            return 1;
        };
        let base = self.config.pinned_z_base;

        match self.columns[index].pinned {
            PinSide::None => 1,
            PinSide::Left => {
                let left_count = count_pinned(&self.columns, PinSide::Left);
                let preceding = count_pinned(&self.columns[..index], PinSide::Left);
                base + (left_count - preceding) as u32
            }
            PinSide::Right => {
                let following = count_pinned(&self.columns[index + 1..], PinSide::Right);
                base + following as u32 + 1
            }
        }
    }

    /// Returns `true` for the rightmost left-pinned column (shadow edge).
    pub fn is_last_left_pinned(&self, key: &str) -> bool {
        self.columns
            .iter()
            .rev()
            .find(|c| c.pinned == PinSide::Left)
            .is_some_and(|c| c.key == key)
    }

    /// Returns `true` for the leftmost right-pinned column (shadow edge).
    pub fn is_first_right_pinned(&self, key: &str) -> bool {
        self.columns
            .iter()
            .find(|c| c.pinned == PinSide::Right)
            .is_some_and(|c| c.key == key)
    }
}

fn count_pinned(columns: &[ColumnDefinition], side: PinSide) -> usize {
    columns.iter().filter(|c| c.pinned == side).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ColumnLayout {
        let mut layout = ColumnLayout::default();
        layout.set_columns(&[
            ColumnDefinition::new("select", "").width_px(40.0).pin(PinSide::Left),
            ColumnDefinition::new("id", "ID").width_px(60.0).pin(PinSide::Left),
            ColumnDefinition::new("name", "Name").flex(),
            ColumnDefinition::new("total", "Total").width_px(90.0).pin(PinSide::Right),
            ColumnDefinition::new("actions", "").width_px(50.0).pin(PinSide::Right),
        ]);
        layout
    }

    #[test]
    fn test_pinned_offsets() {
        let layout = layout();

        assert_eq!(layout.pinned_offset("select"), Some(0.0));
        assert_eq!(layout.pinned_offset("id"), Some(40.0));
        assert_eq!(layout.pinned_offset("name"), None);
        assert_eq!(layout.pinned_offset("total"), Some(50.0));
        assert_eq!(layout.pinned_offset("actions"), Some(0.0));
    }

    #[test]
    fn test_pinned_offsets_follow_resize() {
        let mut layout = layout();

        layout.start_resize("select", 0.0, None);
        layout.on_pointer_move(60.0);
        layout.stop_resize();
        assert_eq!(layout.pinned_offset("id"), Some(100.0));
    }

    #[test]
    fn test_pinned_without_width_uses_default() {
        let mut layout = ColumnLayout::default();
        layout.set_columns(&[
            ColumnDefinition::new("a", "A").pin(PinSide::Left),
            ColumnDefinition::new("b", "B").pin(PinSide::Left),
        ]);
        assert_eq!(layout.pinned_offset("b"), Some(150.0));
    }

    #[test]
    fn test_z_index() {
        let layout = layout();

        assert_eq!(layout.z_index("select"), 52);
        assert_eq!(layout.z_index("id"), 51);
        assert_eq!(layout.z_index("name"), 1);
        assert_eq!(layout.z_index("total"), 52);
        assert_eq!(layout.z_index("actions"), 51);
    }

    #[test]
    fn test_shadow_edges() {
        let layout = layout();

        assert!(layout.is_last_left_pinned("id"));
        assert!(!layout.is_last_left_pinned("select"));
        assert!(layout.is_first_right_pinned("total"));
        assert!(!layout.is_first_right_pinned("actions"));
    }
}
