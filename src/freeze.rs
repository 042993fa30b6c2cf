//! State machines guarding video presentation across geometry changes.
//!
//! [`FreezeState`] is used by the subsurface variants: rendering is paused
//! before the subsurface geometry is touched and only resumed after the
//! widget repainted with the new geometry. [`GeometryChange`] is the
//! two-phase bracket the toplevel-surface variant aligns with the paint cycle.

use crate::geometry::Rectangle;

/// Commit mode of a `wl_subsurface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Buffer commits are applied together with the parent's next commit.
    Sync,
    /// Buffer commits are applied on their own.
    Desync,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    #[default]
    Live,
    Frozen,
}

impl FreezeState {
    /// Enter `Frozen`. Returns `false` if already frozen.
    pub fn freeze(&mut self) -> bool {
        match self {
            FreezeState::Live => {
                *self = FreezeState::Frozen;
                true
            }
            FreezeState::Frozen => false,
        }
    }

    /// Leave `Frozen`. Returns `false` if rendering was live.
    pub fn thaw(&mut self) -> bool {
        match self {
            FreezeState::Frozen => {
                *self = FreezeState::Live;
                true
            }
            FreezeState::Live => false,
        }
    }

    pub fn is_frozen(&self) -> bool {
        *self == FreezeState::Frozen
    }

    /// The subsurface commit mode matching this state.
    pub fn commit_mode(&self) -> CommitMode {
        match self {
            FreezeState::Live => CommitMode::Desync,
            FreezeState::Frozen => CommitMode::Sync,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GeometryChange {
    #[default]
    Idle,
    Changing,
}

impl GeometryChange {
    /// Returns `false` if a change is already in progress.
    pub fn begin(&mut self) -> bool {
        match self {
            GeometryChange::Idle => {
                *self = GeometryChange::Changing;
                true
            }
            GeometryChange::Changing => false,
        }
    }

    /// Returns `false` if no change was in progress.
    pub fn end(&mut self) -> bool {
        match self {
            GeometryChange::Changing => {
                *self = GeometryChange::Idle;
                true
            }
            GeometryChange::Idle => false,
        }
    }
}

/// Which toplevel configure events start a freeze.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FreezePolicy {
    /// Every configure event of the toplevel, including moves.
    #[default]
    EveryConfigure,
    /// Only configure events that change the toplevel size.
    SizeChange,
}

impl FreezePolicy {
    pub fn starts_resize(&self, previous: Option<&Rectangle>, current: &Rectangle) -> bool {
        match self {
            FreezePolicy::EveryConfigure => true,
            FreezePolicy::SizeChange => previous.map_or(true, |previous| !previous.same_size(current)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_is_idempotent() {
        let mut state = FreezeState::default();
        assert!(state.freeze());
        assert!(!state.freeze());
        assert_eq!(state, FreezeState::Frozen);
        assert_eq!(state.commit_mode(), CommitMode::Sync);
    }

    #[test]
    fn thaw_only_from_frozen() {
        let mut state = FreezeState::default();
        assert!(!state.thaw());
        state.freeze();
        assert!(state.thaw());
        assert!(!state.thaw());
        assert_eq!(state.commit_mode(), CommitMode::Desync);
    }

    #[test]
    fn geometry_change_does_not_nest() {
        let mut change = GeometryChange::default();
        assert!(!change.end());
        assert!(change.begin());
        assert!(!change.begin());
        assert!(change.end());
        assert_eq!(change, GeometryChange::Idle);
    }

    #[test]
    fn size_change_policy_ignores_moves() {
        let policy = FreezePolicy::SizeChange;
        let before = Rectangle::new(0, 0, 800, 600);
        assert!(policy.starts_resize(None, &before));
        assert!(!policy.starts_resize(Some(&before), &Rectangle::new(40, 40, 800, 600)));
        assert!(policy.starts_resize(Some(&before), &Rectangle::new(0, 0, 801, 600)));
    }

    #[test]
    fn every_configure_policy_always_freezes() {
        let rect = Rectangle::new(0, 0, 800, 600);
        assert!(FreezePolicy::EveryConfigure.starts_resize(Some(&rect), &rect));
    }
}
