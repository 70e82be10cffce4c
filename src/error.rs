// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Surface error: no drawing surface was supplied")]
    SurfaceMissing, // Caller passed no surface at all
    #[error("Surface error: the 2D drawing context could not be obtained")]
    ContextUnavailable, // Surface refused to hand out a context
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_part() {
        assert!(Error::SurfaceMissing.to_string().contains("no drawing surface"));
        assert!(Error::ContextUnavailable.to_string().contains("2D drawing context"));
        assert_eq!(
            Error::WindowInit("no display".into()).to_string(),
            "Window init error: no display"
        );
    }
}
