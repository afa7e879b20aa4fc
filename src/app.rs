//! Default winit host: one window, one [`Viewer`], redraws driven by
//! `about_to_wait` until the viewer reports disposal.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::errors::Result;
use crate::viewer::{Viewer, ViewerOptions};

struct App {
    window: Option<Arc<Window>>,
    viewer: Viewer,
}

impl App {
    fn new(options: ViewerOptions) -> Self {
        Self {
            window: None,
            viewer: Viewer::new(options),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("marionette")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        if let Err(err) = self
            .viewer
            .mount(Arc::clone(&window), size.width, size.height)
        {
            log::error!("Fatal GPU initialization error: {err}");
            event_loop.exit();
            return;
        }

        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.viewer.dispose();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.viewer.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if !self.viewer.frame() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_disposed() {
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Runs the viewer in a window until it is closed.
pub fn run(options: ViewerOptions) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(options);
    event_loop.run_app(&mut app)?;

    // CloseRequested already disposed; this covers other exit paths.
    app.viewer.dispose();
    Ok(())
}
