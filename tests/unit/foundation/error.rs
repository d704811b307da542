use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ThemeloopError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ThemeloopError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(
        ThemeloopError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        ThemeloopError::driver("x")
            .to_string()
            .contains("driver error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ThemeloopError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
