/// Errors from the pixel compositing helpers.
#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error(
        "foreground {width}x{height} at ({x}, {y}) does not fit background {bg_width}x{bg_height}"
    )]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bg_width: u32,
        bg_height: u32,
    },
    #[error("mask is {mask_width}x{mask_height} but image is {width}x{height}")]
    MaskSizeMismatch {
        mask_width: u32,
        mask_height: u32,
        width: u32,
        height: u32,
    },
}

/// Errors from reading or writing annotation files.
#[derive(thiserror::Error, Debug)]
pub enum AnnotationError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed annotation line: {line:?}")]
    Parse { line: String },
}
