use crate::error::RenderError;

/// Resource state of one back buffer.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum TargetState {
    /// Owned by the presentation engine.
    #[default]
    Present,
    /// Bound as the color attachment of the frame being recorded.
    RenderTarget,
}

/// Per-buffer state tracking with checked transitions.
///
/// Pure bookkeeping; holds no GPU objects so it can be tested headlessly.
#[derive(Debug, Clone)]
pub struct TargetStates {
    states: Vec<TargetState>,
}

impl TargetStates {
    pub fn new(count: usize) -> Self {
        Self {
            states: vec![TargetState::Present; count],
        }
    }

    pub fn get(&self, index: usize) -> Result<TargetState, RenderError> {
        self.states
            .get(index)
            .copied()
            .ok_or(RenderError::TargetIndex {
                index,
                count: self.states.len(),
            })
    }

    /// Target currently in `RenderTarget`, if any.
    pub fn rendering(&self) -> Option<usize> {
        self.states
            .iter()
            .position(|s| *s == TargetState::RenderTarget)
    }

    /// `Present → RenderTarget`.
    pub fn begin(&mut self, index: usize) -> Result<(), RenderError> {
        let found = self.get(index)?;
        if let Some(busy) = self.rendering().filter(|&busy| busy != index) {
            return Err(RenderError::TargetBusy { index, busy });
        }
        if found != TargetState::Present {
            return Err(RenderError::TargetState {
                index,
                expected: TargetState::Present,
                found,
            });
        }
        self.states[index] = TargetState::RenderTarget;
        Ok(())
    }

    /// `RenderTarget → Present`.
    pub fn end(&mut self, index: usize) -> Result<(), RenderError> {
        let found = self.get(index)?;
        if found != TargetState::RenderTarget {
            return Err(RenderError::TargetState {
                index,
                expected: TargetState::RenderTarget,
                found,
            });
        }
        self.states[index] = TargetState::Present;
        Ok(())
    }

    /// Fails unless `index` is back in `Present`.
    pub fn expect_presentable(&self, index: usize) -> Result<(), RenderError> {
        let found = self.get(index)?;
        if found != TargetState::Present {
            return Err(RenderError::TargetState {
                index,
                expected: TargetState::Present,
                found,
            });
        }
        Ok(())
    }
}

/// Render-target view table: one slot per back buffer.
pub struct RenderTargetTable {
    views: Vec<Option<wgpu::TextureView>>,
    states: TargetStates,
}

impl RenderTargetTable {
    pub fn new(count: usize) -> Self {
        Self {
            views: (0..count).map(|_| None).collect(),
            states: TargetStates::new(count),
        }
    }

    pub fn count(&self) -> usize {
        self.views.len()
    }

    pub fn register(&mut self, index: usize, view: wgpu::TextureView) -> Result<(), RenderError> {
        let count = self.views.len();
        let slot = self
            .views
            .get_mut(index)
            .ok_or(RenderError::TargetIndex { index, count })?;
        *slot = Some(view);
        Ok(())
    }

    /// Drops the view in `index`. Window surfaces hand out a new texture per
    /// acquire, so their views do not outlive a present.
    pub fn release(&mut self, index: usize) {
        if let Some(slot) = self.views.get_mut(index) {
            *slot = None;
        }
    }

    pub fn view(&self, index: usize) -> Result<&wgpu::TextureView, RenderError> {
        let count = self.views.len();
        self.views
            .get(index)
            .ok_or(RenderError::TargetIndex { index, count })?
            .as_ref()
            .ok_or(RenderError::TargetViewMissing { index })
    }

    pub fn states(&self) -> &TargetStates {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut TargetStates {
        &mut self.states
    }
}

/// Back buffer handed out for the current frame.
///
/// Window-backed targets carry the surface texture, which must be presented
/// (not dropped) to reach the screen.
pub struct FrameTarget {
    pub index: usize,
    pub(crate) surface_texture: Option<wgpu::SurfaceTexture>,
}

impl FrameTarget {
    pub(crate) fn owned(index: usize) -> Self {
        Self {
            index,
            surface_texture: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_start_presentable() {
        let states = TargetStates::new(2);
        assert_eq!(states.get(0).unwrap(), TargetState::Present);
        assert_eq!(states.get(1).unwrap(), TargetState::Present);
        assert_eq!(states.rendering(), None);
    }

    #[test]
    fn begin_then_end_round_trips() {
        let mut states = TargetStates::new(2);
        states.begin(1).unwrap();
        assert_eq!(states.rendering(), Some(1));
        states.end(1).unwrap();
        states.expect_presentable(1).unwrap();
    }

    #[test]
    fn double_begin_is_rejected() {
        let mut states = TargetStates::new(2);
        states.begin(0).unwrap();
        let err = states.begin(0).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TargetState {
                index: 0,
                expected: TargetState::Present,
                found: TargetState::RenderTarget,
            }
        ));
    }

    #[test]
    fn only_one_target_renders_at_a_time() {
        let mut states = TargetStates::new(2);
        states.begin(0).unwrap();
        assert!(matches!(
            states.begin(1).unwrap_err(),
            RenderError::TargetBusy { index: 1, busy: 0 }
        ));
    }

    #[test]
    fn end_without_begin_is_rejected() {
        let mut states = TargetStates::new(2);
        assert!(matches!(
            states.end(1).unwrap_err(),
            RenderError::TargetState { index: 1, .. }
        ));
    }

    #[test]
    fn presenting_a_target_still_being_rendered_is_rejected() {
        let mut states = TargetStates::new(2);
        states.begin(0).unwrap();
        assert!(states.expect_presentable(0).is_err());
    }

    #[test]
    fn out_of_range_index_is_reported() {
        let mut states = TargetStates::new(2);
        assert!(matches!(
            states.begin(2).unwrap_err(),
            RenderError::TargetIndex { index: 2, count: 2 }
        ));
    }

    #[test]
    fn missing_view_is_reported() {
        let table = RenderTargetTable::new(2);
        assert_eq!(table.count(), 2);
        assert!(matches!(
            table.view(0).unwrap_err(),
            RenderError::TargetViewMissing { index: 0 }
        ));
        assert!(matches!(
            table.view(5).unwrap_err(),
            RenderError::TargetIndex { index: 5, count: 2 }
        ));
    }
}
