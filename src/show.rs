pub(crate) mod bank;
pub(crate) mod pair;
pub(crate) mod paths;
pub(crate) mod theme;
