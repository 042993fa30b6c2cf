//! Geometry synchronization between the GTK widget, the Wayland
//! (sub)surface and the video sink.

use crate::freeze::{CommitMode, FreezePolicy, FreezeState, GeometryChange};
use crate::geometry::Rectangle;
use crate::sink::RenderControl;
use crate::subcompositor::SubsurfaceControl;

/// How presentation is kept consistent while the geometry changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryProtocol {
    /// Pause rendering and switch the subsurface to sync mode while the
    /// toplevel is resized, resume on the next paint.
    PauseResume,
    /// Push the render rectangle on every paint, bracketed by
    /// begin/end geometry change around the paint cycle.
    Bracket,
    /// Push the render rectangle on every paint.
    RenderRectangle,
}

#[derive(Debug)]
pub struct Coordinator<R, S> {
    render: R,
    subsurface: Option<S>,
    protocol: GeometryProtocol,
    policy: FreezePolicy,
    freeze: FreezeState,
    geometry_change: GeometryChange,
    allocation: Rectangle,
    last_toplevel: Option<Rectangle>,
    realized: bool,
}

impl<R: RenderControl, S: SubsurfaceControl> Coordinator<R, S> {
    pub fn new(render: R, protocol: GeometryProtocol, policy: FreezePolicy) -> Self {
        Self {
            render,
            subsurface: None,
            protocol,
            policy,
            freeze: FreezeState::default(),
            geometry_change: GeometryChange::default(),
            allocation: Rectangle::default(),
            last_toplevel: None,
            realized: false,
        }
    }

    /// The video widget got its native resources and its handles were
    /// published. Rendering paused by an earlier unrealize is resumed and a
    /// subsurface, if any, is placed at `position` in desync mode.
    pub fn realized(&mut self, allocation: Rectangle, position: (i32, i32), subsurface: Option<S>) {
        self.allocation = allocation;
        self.geometry_change = GeometryChange::Idle;
        if self.freeze.thaw() {
            self.render.resume_rendering();
        }

        if let Some(subsurface) = subsurface.as_ref() {
            subsurface.set_position(position.0, position.1);
            subsurface.set_commit_mode(self.freeze.commit_mode());
        }
        self.subsurface = subsurface;
        self.realized = true;
    }

    /// The widget lost its native resources. Rendering stays paused until the
    /// widget is realized again.
    pub fn unrealized(&mut self) {
        if !self.realized {
            return;
        }

        if self.freeze.freeze() {
            self.render.pause_rendering();
        }
        self.subsurface = None;
        self.realized = false;
    }

    /// The toplevel window was moved or resized.
    pub fn toplevel_configured(&mut self, rect: Rectangle) {
        if !self.realized {
            return;
        }

        let starts_resize = self.policy.starts_resize(self.last_toplevel.as_ref(), &rect);
        self.last_toplevel = Some(rect);

        if self.protocol != GeometryProtocol::PauseResume || !starts_resize {
            return;
        }

        if self.freeze.freeze() {
            self.render.pause_rendering();
            if let Some(subsurface) = self.subsurface.as_ref() {
                subsurface.set_commit_mode(self.freeze.commit_mode());
            }
        }
    }

    /// The video widget was moved or resized within the toplevel. A report
    /// at the origin is not final yet and ignored.
    pub fn widget_configured(&mut self, rect: Rectangle) {
        if !self.realized {
            return;
        }

        self.allocation = rect;
        if rect.is_origin() {
            return;
        }

        if let Some(subsurface) = self.subsurface.as_ref() {
            subsurface.set_position(rect.x, rect.y);
        }
        self.render.set_surface_size(rect.width, rect.height);
    }

    /// The video widget is being painted with `allocation`.
    pub fn drawn(&mut self, allocation: Rectangle) {
        if !self.realized {
            return;
        }

        self.allocation = allocation;

        match self.protocol {
            GeometryProtocol::PauseResume => {
                if self.freeze.thaw() {
                    self.render.resume_rendering();
                    if let Some(subsurface) = self.subsurface.as_ref() {
                        subsurface.set_commit_mode(self.freeze.commit_mode());
                    }
                }
            }
            GeometryProtocol::Bracket => {
                if self.geometry_change.begin() {
                    self.render.begin_geometry_change();
                }
                self.render.set_render_rectangle(allocation);
            }
            GeometryProtocol::RenderRectangle => {
                self.render.set_render_rectangle(allocation);
            }
        }
    }

    /// The frame clock finished painting the toplevel.
    pub fn after_paint(&mut self) {
        if self.protocol == GeometryProtocol::Bracket && self.geometry_change.end() {
            self.render.end_geometry_change();
        }
    }

    pub fn is_realized(&self) -> bool {
        self.realized
    }

    pub fn freeze_state(&self) -> FreezeState {
        self.freeze
    }

    pub fn geometry_change(&self) -> GeometryChange {
        self.geometry_change
    }

    pub fn commit_mode(&self) -> Option<CommitMode> {
        self.subsurface.as_ref().map(|_| self.freeze.commit_mode())
    }

    pub fn allocation(&self) -> Rectangle {
        self.allocation
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Pause,
        Resume,
        SurfaceSize(i32, i32),
        Begin,
        End,
        RenderRectangle(Rectangle),
        Position(i32, i32),
        Mode(CommitMode),
    }

    #[derive(Debug, Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<Call>>>);

    impl Recorder {
        fn take(&self) -> Vec<Call> {
            std::mem::take(&mut *self.0.borrow_mut())
        }

        fn push(&self, call: Call) {
            self.0.borrow_mut().push(call);
        }
    }

    impl RenderControl for Recorder {
        fn pause_rendering(&self) {
            self.push(Call::Pause)
        }
        fn resume_rendering(&self) {
            self.push(Call::Resume)
        }
        fn set_surface_size(&self, width: i32, height: i32) {
            self.push(Call::SurfaceSize(width, height))
        }
        fn begin_geometry_change(&self) {
            self.push(Call::Begin)
        }
        fn end_geometry_change(&self) {
            self.push(Call::End)
        }
        fn set_render_rectangle(&self, rect: Rectangle) {
            self.push(Call::RenderRectangle(rect))
        }
    }

    impl SubsurfaceControl for Recorder {
        fn set_position(&self, x: i32, y: i32) {
            self.push(Call::Position(x, y))
        }
        fn set_commit_mode(&self, mode: CommitMode) {
            self.push(Call::Mode(mode))
        }
    }

    fn subsurface_coordinator(policy: FreezePolicy) -> (Coordinator<Recorder, Recorder>, Recorder) {
        let recorder = Recorder::default();
        let mut coordinator =
            Coordinator::new(recorder.clone(), GeometryProtocol::PauseResume, policy);
        coordinator.realized(
            Rectangle::new(0, 0, 640, 480),
            (10, 20),
            Some(recorder.clone()),
        );
        (coordinator, recorder)
    }

    #[test]
    fn realize_places_subsurface_in_desync_mode() {
        let (coordinator, recorder) = subsurface_coordinator(FreezePolicy::EveryConfigure);
        assert_eq!(
            recorder.take(),
            vec![Call::Position(10, 20), Call::Mode(CommitMode::Desync)]
        );
        assert_eq!(coordinator.commit_mode(), Some(CommitMode::Desync));
    }

    #[test]
    fn nothing_happens_before_realize() {
        let recorder = Recorder::default();
        let mut coordinator: Coordinator<Recorder, Recorder> = Coordinator::new(
            recorder.clone(),
            GeometryProtocol::PauseResume,
            FreezePolicy::EveryConfigure,
        );
        coordinator.toplevel_configured(Rectangle::new(0, 0, 800, 600));
        coordinator.widget_configured(Rectangle::new(5, 5, 100, 100));
        coordinator.drawn(Rectangle::new(5, 5, 100, 100));
        coordinator.unrealized();
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn resize_burst_pauses_once() {
        let (mut coordinator, recorder) = subsurface_coordinator(FreezePolicy::EveryConfigure);
        recorder.take();

        for width in 800..805 {
            coordinator.toplevel_configured(Rectangle::new(0, 0, width, 600));
        }
        assert_eq!(
            recorder.take(),
            vec![Call::Pause, Call::Mode(CommitMode::Sync)]
        );
        assert_eq!(coordinator.commit_mode(), Some(CommitMode::Sync));

        coordinator.drawn(Rectangle::new(10, 20, 780, 580));
        coordinator.drawn(Rectangle::new(10, 20, 780, 580));
        assert_eq!(
            recorder.take(),
            vec![Call::Resume, Call::Mode(CommitMode::Desync)]
        );
        assert_eq!(coordinator.freeze_state(), FreezeState::Live);

        coordinator.toplevel_configured(Rectangle::new(0, 0, 900, 600));
        assert_eq!(
            recorder.take(),
            vec![Call::Pause, Call::Mode(CommitMode::Sync)]
        );
    }

    #[test]
    fn size_change_policy_does_not_freeze_on_move() {
        let (mut coordinator, recorder) = subsurface_coordinator(FreezePolicy::SizeChange);
        coordinator.toplevel_configured(Rectangle::new(0, 0, 800, 600));
        coordinator.drawn(Rectangle::new(10, 20, 640, 480));
        recorder.take();

        coordinator.toplevel_configured(Rectangle::new(100, 50, 800, 600));
        assert!(recorder.take().is_empty());
        assert_eq!(coordinator.freeze_state(), FreezeState::Live);

        coordinator.toplevel_configured(Rectangle::new(100, 50, 820, 600));
        assert_eq!(
            recorder.take(),
            vec![Call::Pause, Call::Mode(CommitMode::Sync)]
        );
    }

    #[test]
    fn widget_configure_at_origin_is_ignored() {
        let (mut coordinator, recorder) = subsurface_coordinator(FreezePolicy::EveryConfigure);
        recorder.take();

        coordinator.widget_configured(Rectangle::new(0, 0, 320, 240));
        assert!(recorder.take().is_empty());
        assert_eq!(coordinator.allocation(), Rectangle::new(0, 0, 320, 240));

        coordinator.widget_configured(Rectangle::new(12, 34, 320, 240));
        assert_eq!(
            recorder.take(),
            vec![Call::Position(12, 34), Call::SurfaceSize(320, 240)]
        );
    }

    #[test]
    fn unrealize_pauses_and_drops_subsurface() {
        let (mut coordinator, recorder) = subsurface_coordinator(FreezePolicy::EveryConfigure);
        recorder.take();

        coordinator.unrealized();
        assert_eq!(recorder.take(), vec![Call::Pause]);
        assert!(!coordinator.is_realized());
        assert_eq!(coordinator.commit_mode(), None);
        assert_eq!(coordinator.freeze_state(), FreezeState::Frozen);

        coordinator.unrealized();
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn unrealize_then_realize_resumes() {
        let (mut coordinator, recorder) = subsurface_coordinator(FreezePolicy::EveryConfigure);
        recorder.take();

        coordinator.unrealized();
        assert_eq!(recorder.take(), vec![Call::Pause]);

        coordinator.realized(
            Rectangle::new(0, 0, 640, 480),
            (10, 20),
            Some(recorder.clone()),
        );
        assert_eq!(
            recorder.take(),
            vec![
                Call::Resume,
                Call::Position(10, 20),
                Call::Mode(CommitMode::Desync)
            ]
        );
        assert_eq!(coordinator.freeze_state(), FreezeState::Live);

        // the next paint must not resume a second time
        coordinator.drawn(Rectangle::new(10, 20, 640, 480));
        assert!(recorder.take().is_empty());

        coordinator.toplevel_configured(Rectangle::new(0, 0, 800, 600));
        assert_eq!(
            recorder.take(),
            vec![Call::Pause, Call::Mode(CommitMode::Sync)]
        );
    }

    #[test]
    fn bracket_spans_paint_cycle() {
        let recorder = Recorder::default();
        let mut coordinator: Coordinator<Recorder, Recorder> = Coordinator::new(
            recorder.clone(),
            GeometryProtocol::Bracket,
            FreezePolicy::EveryConfigure,
        );
        coordinator.realized(Rectangle::new(0, 0, 640, 480), (0, 0), None);

        let first = Rectangle::new(0, 0, 640, 480);
        let second = Rectangle::new(0, 0, 700, 500);
        coordinator.toplevel_configured(Rectangle::new(0, 0, 700, 500));
        coordinator.drawn(first);
        coordinator.drawn(second);
        coordinator.after_paint();
        coordinator.after_paint();

        assert_eq!(
            recorder.take(),
            vec![
                Call::Begin,
                Call::RenderRectangle(first),
                Call::RenderRectangle(second),
                Call::End,
            ]
        );
        assert_eq!(coordinator.geometry_change(), GeometryChange::Idle);
    }

    #[test]
    fn render_rectangle_follows_last_allocation() {
        let recorder = Recorder::default();
        let mut coordinator: Coordinator<Recorder, Recorder> = Coordinator::new(
            recorder.clone(),
            GeometryProtocol::RenderRectangle,
            FreezePolicy::EveryConfigure,
        );
        coordinator.realized(Rectangle::new(0, 0, 640, 480), (0, 0), None);

        for width in [640, 660, 700] {
            let allocation = Rectangle::new(0, 40, width, 480);
            coordinator.drawn(allocation);
            assert_eq!(recorder.take(), vec![Call::RenderRectangle(allocation)]);
            assert_eq!(coordinator.allocation(), allocation);
        }

        coordinator.after_paint();
        assert!(recorder.take().is_empty());
    }
}
