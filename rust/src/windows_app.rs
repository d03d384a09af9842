use anyhow::{Context, Result};
use prompt_studio::server::{launch, AppServer};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::WindowsAndMessaging::{
    LoadImageW, SendMessageW, ICON_BIG, ICON_SMALL, IMAGE_ICON, LR_DEFAULTSIZE, LR_SHARED,
    WM_SETICON,
};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::windows::EventLoopBuilderExtWindows;
use winit::window::{Window, WindowId};
use wry::{WebView, WebViewBuilder};

pub fn run(config_arg: Option<String>) -> Result<()> {
    let (_state, server) = launch(config_arg)?;
    let url = format!("http://127.0.0.1:{}/", server.port());

    let event_loop = build_event_loop().context("failed to create event loop")?;
    let mut app = DesktopApp::new(url, server);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated unexpectedly")?;

    Ok(())
}

struct DesktopApp {
    url: String,
    window: Option<Window>,
    webview: Option<WebView>,
    server: Option<AppServer>,
}

impl DesktopApp {
    fn new(url: String, server: AppServer) -> Self {
        Self {
            url,
            window: None,
            webview: None,
            server: Some(server),
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.window.is_some() {
            return Ok(());
        }

        let attrs = Window::default_attributes()
            .with_title("Prompt Studio")
            .with_inner_size(LogicalSize::new(1180.0, 780.0));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create main window")?;
        apply_window_icon(&window);

        let webview = WebViewBuilder::new()
            .with_url(&self.url)
            .build(&window)
            .context("failed to build webview")?;

        self.webview = Some(webview);
        self.window = Some(window);
        Ok(())
    }

    fn shutdown_server(&mut self) {
        if let Some(mut server) = self.server.take() {
            server.stop();
        }
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.init_window(event_loop) {
            eprintln!("{err}");
            self.shutdown_server();
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            self.shutdown_server();
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown_server();
    }
}

fn build_event_loop() -> Result<EventLoop<()>> {
    let mut builder = EventLoop::builder();
    // DPI mode comes from the app manifest; avoid duplicating it here.
    builder.with_dpi_aware(false);
    builder.build().map_err(Into::into)
}

/// Applies the icon winres embeds as the first icon resource; silently does
/// nothing when the binary was built without one.
fn apply_window_icon(window: &Window) {
    let Some(hwnd) = hwnd_from_window(window) else {
        return;
    };

    let module = unsafe { GetModuleHandleW(core::ptr::null()) };
    if module.is_null() {
        return;
    }

    let icon_resource_id = 1usize as *const u16;
    let handle = unsafe {
        LoadImageW(
            module,
            icon_resource_id,
            IMAGE_ICON,
            0,
            0,
            LR_DEFAULTSIZE | LR_SHARED,
        )
    };
    if handle.is_null() {
        return;
    }

    unsafe {
        SendMessageW(hwnd, WM_SETICON, ICON_BIG as usize, handle as isize);
        SendMessageW(hwnd, WM_SETICON, ICON_SMALL as usize, handle as isize);
    }
}

fn hwnd_from_window(window: &Window) -> Option<*mut core::ffi::c_void> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(win32) => Some(win32.hwnd.get() as *mut core::ffi::c_void),
        _ => None,
    }
}
