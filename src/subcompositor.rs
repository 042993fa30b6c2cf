use std::os::raw::c_void;

use wayland_client::backend::{Backend, ObjectId};
use wayland_client::globals::{registry_queue_init, GlobalListContents};
use wayland_client::protocol::wl_registry;
use wayland_client::protocol::wl_subcompositor::WlSubcompositor;
use wayland_client::protocol::wl_subsurface::WlSubsurface;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{Connection, Dispatch, EventQueue, Proxy, QueueHandle};

use crate::error::{Error, Result};
use crate::freeze::CommitMode;
use crate::CAT;

/// Operations the geometry synchronizer performs on the video subsurface.
pub trait SubsurfaceControl {
    fn set_position(&self, x: i32, y: i32);
    fn set_commit_mode(&self, mode: CommitMode);
}

#[derive(Debug)]
pub struct SubcompositorState;

impl Dispatch<wl_registry::WlRegistry, GlobalListContents> for SubcompositorState {
    fn event(
        _state: &mut Self,
        _proxy: &wl_registry::WlRegistry,
        _event: wl_registry::Event,
        _data: &GlobalListContents,
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        // Globals appearing later are of no interest
    }
}

impl Dispatch<WlSubcompositor, ()> for SubcompositorState {
    fn event(
        _state: &mut Self,
        _proxy: &WlSubcompositor,
        _event: <WlSubcompositor as Proxy>::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        // No events
    }
}

impl Dispatch<WlSubsurface, ()> for SubcompositorState {
    fn event(
        _state: &mut Self,
        _proxy: &WlSubsurface,
        _event: <WlSubsurface as Proxy>::Event,
        _data: &(),
        _conn: &Connection,
        _qhandle: &QueueHandle<Self>,
    ) {
        // No events
    }
}

/// `wl_subcompositor` bound on a private queue of the GDK display connection.
#[derive(Debug)]
pub struct Subcompositor {
    subcompositor: WlSubcompositor,
    connection: Connection,
    qhandle: QueueHandle<SubcompositorState>,
    _event_queue: EventQueue<SubcompositorState>,
}

/// Look up `wl_subcompositor` on the `struct wl_display *` in `display`.
///
/// Returns `Ok(None)` if the compositor does not advertise it.
pub fn find_subcompositor(display: usize) -> Result<Option<Subcompositor>> {
    if display == 0 {
        return Err(Error::NotWayland);
    }

    // The display stays owned by GDK, wrapping it as a foreign display does not
    // take over the connection.
    let backend = unsafe { Backend::from_foreign_display((display as *mut c_void).cast()) };
    let connection = Connection::from_backend(backend);

    let (globals, event_queue) = registry_queue_init::<SubcompositorState>(&connection)
        .map_err(|err| Error::WaylandConnect(err.to_string()))?;
    let qhandle = event_queue.handle();

    let subcompositor = match globals.bind::<WlSubcompositor, _, _>(&qhandle, 1..=1, ()) {
        Ok(subcompositor) => subcompositor,
        Err(err) => {
            gstreamer::warning!(CAT, "wl_subcompositor not available: {}", err);
            return Ok(None);
        }
    };

    gstreamer::debug!(CAT, "bound {}", subcompositor.id());

    Ok(Some(Subcompositor {
        subcompositor,
        connection,
        qhandle,
        _event_queue: event_queue,
    }))
}

/// Object id of the `struct wl_surface *` in `surface`, owned by GDK.
fn foreign_surface_id(surface: usize) -> Result<ObjectId> {
    if surface == 0 {
        return Err(Error::ForeignSurface("null pointer".to_owned()));
    }

    unsafe { ObjectId::from_ptr(WlSurface::interface(), (surface as *mut c_void).cast()) }
        .map_err(|err| Error::ForeignSurface(format!("{surface:#x}: {err}")))
}

impl Subcompositor {
    fn foreign_surface(&self, surface: usize) -> Result<WlSurface> {
        let id = foreign_surface_id(surface)?;
        WlSurface::from_id(&self.connection, id)
            .map_err(|err| Error::ForeignSurface(format!("{surface:#x}: {err}")))
    }

    /// Make the `struct wl_surface *` in `surface` a subsurface of `parent`.
    pub fn get_subsurface(&self, surface: usize, parent: usize) -> Result<Subsurface> {
        let surface = self.foreign_surface(surface)?;
        let parent = self.foreign_surface(parent)?;

        let subsurface = self
            .subcompositor
            .get_subsurface(&surface, &parent, &self.qhandle, ());

        gstreamer::debug!(
            CAT,
            "created {} for {} below {}",
            subsurface.id(),
            surface.id(),
            parent.id()
        );

        Ok(Subsurface {
            subsurface,
            connection: self.connection.clone(),
        })
    }
}

#[derive(Debug)]
pub struct Subsurface {
    subsurface: WlSubsurface,
    connection: Connection,
}

impl Subsurface {
    fn flush(&self) {
        if let Err(err) = self.connection.flush() {
            gstreamer::warning!(CAT, "failed to flush wayland connection: {}", err);
        }
    }
}

impl SubsurfaceControl for Subsurface {
    fn set_position(&self, x: i32, y: i32) {
        self.subsurface.set_position(x, y);
        self.flush();
    }

    fn set_commit_mode(&self, mode: CommitMode) {
        match mode {
            CommitMode::Sync => self.subsurface.set_sync(),
            CommitMode::Desync => self.subsurface.set_desync(),
        }
        self.flush();
    }
}

impl Drop for Subsurface {
    fn drop(&mut self) {
        self.subsurface.destroy();
        self.flush();
    }
}
