use std::path::PathBuf;

/// Startup failures. The running toy itself has no failure modes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read font {}: {source}", path.display())]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data: {0}")]
    FontParse(#[from] ab_glyph::InvalidFont),
    #[error("no usable sans-serif system font found")]
    NoSystemFont,
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface creation: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("graphics device request: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
