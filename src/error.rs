pub type PixformResult<T> = Result<T, PixformError>;

#[derive(thiserror::Error, Debug)]
pub enum PixformError {
    #[error("input error: {0}")]
    Input(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixformError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            PixformError::input("x")
                .to_string()
                .contains("input error:")
        );
        assert!(
            PixformError::render("x")
                .to_string()
                .contains("render error:")
        );
        assert!(
            PixformError::encode("x")
                .to_string()
                .contains("encode error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = PixformError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
