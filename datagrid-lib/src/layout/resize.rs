//! Interactive column resize

use log::debug;
use log::warn;

use super::ColumnLayout;

/// A live drag-resize of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    /// Column being resized.
    pub key: String,
    /// Pointer X at drag start.
    pub start_x: f32,
    /// Column width at drag start.
    pub start_width: f32,
}

impl ColumnLayout {
    /// Starts resizing a column.
    ///
    /// `measured` is the rendered width of the column, used as the baseline
    /// when the column has neither an override nor a pixel width. A session
    /// that is still active is ended first. Returns `false` if the column is
    /// unknown or not resizable.
    pub fn start_resize(&mut self, key: &str, pointer_x: f32, measured: Option<f32>) -> bool {
        if let Some(stale) = self.session.take() {
            debug!("Ending stale resize of column {}", stale.key);
        }

        let Some(column) = self.column(key) else {
            warn!("Cannot resize unknown column {}", key);
            return false;
        };
        if !self.is_resizable(column) {
            return false;
        }

        let start_width = self
            .overrides
            .get(key)
            .copied()
            .or_else(|| column.width.pixels())
            .or(measured)
            .unwrap_or(self.config.default_column_width);

        debug!("Resize start: {} at {}px", key, start_width);
        self.session = Some(ResizeSession {
            key: key.to_string(),
            start_x: pointer_x,
            start_width,
        });
        true
    }

    /// Applies a pointer move to the active session.
    ///
    /// Returns the new width, or `None` when no resize is in progress.
    pub fn on_pointer_move(&mut self, pointer_x: f32) -> Option<f32> {
        let session = self.session.as_ref()?;
        let width = (session.start_width + (pointer_x - session.start_x))
            .max(self.config.min_column_width);
        let key = session.key.clone();

        if self.overrides.get(&key) != Some(&width) {
            self.write_override(&key, width);
        }
        Some(width)
    }

    /// Ends the active session, returning it.
    pub fn stop_resize(&mut self) -> Option<ResizeSession> {
        let session = self.session.take();
        if let Some(session) = &session {
            debug!(
                "Resize stop: {} at {:?}px",
                session.key,
                self.overrides.get(&session.key)
            );
        }
        session
    }

    /// Returns the active session, if any.
    pub fn resize_session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    /// Returns `true` while a resize is in progress.
    pub fn is_resizing(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::layout::TrackSize;
    use crate::model::ColumnDefinition;

    use super::*;

    fn layout() -> ColumnLayout {
        let mut layout = ColumnLayout::default();
        layout.set_columns(&[
            ColumnDefinition::new("id", "ID").width_px(60.0),
            ColumnDefinition::new("name", "Name").flex(),
            ColumnDefinition::new("notes", "Notes"),
        ]);
        layout
    }

    #[test]
    fn test_drag_and_reset() {
        let mut layout = layout();

        assert!(layout.start_resize("id", 200.0, None));
        assert_eq!(layout.on_pointer_move(240.0), Some(100.0));
        layout.stop_resize();

        assert_eq!(layout.overrides().get("id"), Some(&100.0));
        assert_eq!(layout.column_width("id"), Some(100.0));

        layout.reset_column("id");
        let column = layout.column("id").unwrap().clone();
        assert_eq!(layout.track_size(&column), TrackSize::Px(60.0));
    }

    #[test]
    fn test_min_width_clamp() {
        let mut layout = layout();

        layout.start_resize("id", 200.0, None);
        assert_eq!(layout.on_pointer_move(0.0), Some(85.0));
    }

    #[test]
    fn test_flex_column_ignores_resize() {
        let mut layout = layout();

        assert!(!layout.start_resize("name", 0.0, Some(300.0)));
        assert_eq!(layout.on_pointer_move(50.0), None);
        assert!(layout.overrides().is_empty());
        assert!(!layout.start_resize("missing", 0.0, None));
    }

    #[test]
    fn test_baseline_resolution() {
        let mut layout = layout();

        // measured width used when no pixel width is given
        layout.start_resize("notes", 0.0, Some(180.0));
        assert_eq!(layout.resize_session().unwrap().start_width, 180.0);

        // no measurement: default width
        layout.start_resize("notes", 0.0, None);
        assert_eq!(layout.resize_session().unwrap().start_width, 150.0);

        // existing override wins over everything
        layout.on_pointer_move(10.0);
        layout.start_resize("notes", 0.0, Some(999.0));
        assert_eq!(layout.resize_session().unwrap().start_width, 160.0);
    }

    #[test]
    fn test_new_session_replaces_stale() {
        let mut layout = layout();

        layout.start_resize("id", 0.0, None);
        layout.start_resize("notes", 100.0, None);
        assert_eq!(layout.resize_session().unwrap().key, "notes");

        layout.on_pointer_move(120.0);
        assert!(layout.overrides().get("id").is_none());
        assert_eq!(layout.overrides().get("notes"), Some(&170.0));
    }
}
